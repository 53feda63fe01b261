//! Method descriptors.
//!
//! A [`Method`] ties an endpoint path to the request payload it posts and the
//! response body it expects back. The descriptors are grouped by family:
//!
//! - [`root`] — root finding on a single-variable expression
//! - [`linear`] — direct and iterative linear-system solvers
//! - [`interpolation`] — polynomial and spline interpolation
//!
//! [`MethodKind`] is the runtime registry used to select a descriptor by name.

use std::{fmt, str::FromStr};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::form::{Choice, Form, FormError};

pub mod interpolation;
pub mod linear;
pub mod root;

/// A remote numerical method.
///
/// Implementors are zero-sized markers; the associated types carry the
/// payload and response schemas.
pub trait Method {
    /// Human-readable method name.
    const NAME: &'static str;

    /// Endpoint path relative to the API base, without surrounding slashes.
    const PATH: &'static str;

    /// The family the method belongs to.
    const FAMILY: Family;

    /// A second endpoint posted with the same payload after a successful
    /// first call, if the method has one.
    const FOLLOW_UP: Option<&'static str> = None;

    /// The JSON request payload.
    type Request: Serialize + fmt::Debug;

    /// The JSON success body.
    type Response: DeserializeOwned + fmt::Debug;

    /// Builds the request payload from raw form input.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or malformed.
    fn extract(form: &Form) -> Result<Self::Request, FormError>;
}

/// The family of a numerical method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    RootFinding,
    LinearSystem,
    Interpolation,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RootFinding => "root finding",
            Self::LinearSystem => "linear system",
            Self::Interpolation => "interpolation",
        })
    }
}

/// The convergence metric the service should use.
///
/// Passed through to the service unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Absolute,
    Relative,
}

impl Choice for ErrorType {
    const EXPECTED: &'static str = "`absolute` or `relative`";

    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "absolute" => Some(Self::Absolute),
            "relative" => Some(Self::Relative),
            _ => None,
        }
    }
}

/// Every supported method, selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Bisection,
    FalseRule,
    FixedPoint,
    NewtonRaphson,
    Secant,
    FirstModifiedNewton,
    SecondModifiedNewton,
    GaussElimination,
    LuFactorization,
    Jacobi,
    GaussSeidel,
    Sor,
    Lagrange,
    Newton,
    Vandermonde,
    Spline,
}

/// Error returned when a method name is not recognized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown method `{0}`")]
pub struct UnknownMethod(pub String);

impl MethodKind {
    pub const ALL: [Self; 16] = [
        Self::Bisection,
        Self::FalseRule,
        Self::FixedPoint,
        Self::NewtonRaphson,
        Self::Secant,
        Self::FirstModifiedNewton,
        Self::SecondModifiedNewton,
        Self::GaussElimination,
        Self::LuFactorization,
        Self::Jacobi,
        Self::GaussSeidel,
        Self::Sor,
        Self::Lagrange,
        Self::Newton,
        Self::Vandermonde,
        Self::Spline,
    ];

    /// Returns the endpoint path of the method's descriptor.
    #[must_use]
    pub fn path(self) -> &'static str {
        self.describe().1
    }

    /// Returns the method's human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.describe().0
    }

    #[must_use]
    pub fn family(self) -> Family {
        self.describe().2
    }

    /// Returns the short name used to select the method, the last segment of
    /// its endpoint path.
    #[must_use]
    pub fn slug(self) -> &'static str {
        let path = self.path();
        path.rsplit('/').next().unwrap_or(path)
    }

    fn describe(self) -> (&'static str, &'static str, Family) {
        fn of<M: Method>() -> (&'static str, &'static str, Family) {
            (M::NAME, M::PATH, M::FAMILY)
        }

        match self {
            Self::Bisection => of::<root::Bisection>(),
            Self::FalseRule => of::<root::FalseRule>(),
            Self::FixedPoint => of::<root::FixedPoint>(),
            Self::NewtonRaphson => of::<root::NewtonRaphson>(),
            Self::Secant => of::<root::Secant>(),
            Self::FirstModifiedNewton => of::<root::FirstModifiedNewton>(),
            Self::SecondModifiedNewton => of::<root::SecondModifiedNewton>(),
            Self::GaussElimination => of::<linear::GaussElimination>(),
            Self::LuFactorization => of::<linear::LuFactorization>(),
            Self::Jacobi => of::<linear::Jacobi>(),
            Self::GaussSeidel => of::<linear::GaussSeidel>(),
            Self::Sor => of::<linear::Sor>(),
            Self::Lagrange => of::<interpolation::Lagrange>(),
            Self::Newton => of::<interpolation::Newton>(),
            Self::Vandermonde => of::<interpolation::Vandermonde>(),
            Self::Spline => of::<interpolation::Spline>(),
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for MethodKind {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}
