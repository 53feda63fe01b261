//! Interpolation methods.
//!
//! Each method posts sample points and receives the interpolating polynomial
//! as an expression string in `**` power notation, along with its
//! coefficients and a method-specific working table.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::{Family, Method};
use crate::form::{Choice, Form, FormError};

/// Request carrying the sample points to interpolate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsRequest {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl PointsRequest {
    /// Reads the `x`/`y` grids and the optional precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are malformed or the precision is not
    /// an integer.
    pub fn extract(form: &Form) -> Result<Self, FormError> {
        let (x, y) = form.points("x", "y")?;
        Ok(Self {
            x,
            y,
            precision: form.optional_integer("precision")?,
        })
    }

    /// Iterates over the `(x, y)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Request for piecewise spline interpolation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplineRequest {
    #[serde(flatten)]
    pub points: PointsRequest,
    pub degree: SplineDegree,
}

/// The spline degrees the service supports.
///
/// Sent as the bare integer degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineDegree {
    Linear,
    Cubic,
}

impl SplineDegree {
    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            Self::Linear => 1,
            Self::Cubic => 3,
        }
    }
}

impl Choice for SplineDegree {
    const EXPECTED: &'static str = "`1` (linear) or `3` (cubic)";

    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "1" | "linear" => Some(Self::Linear),
            "3" | "cubic" => Some(Self::Cubic),
            _ => None,
        }
    }
}

impl Serialize for SplineDegree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value())
    }
}

/// Access to the sample points a request carries.
pub trait SampleRequest {
    fn sample(&self) -> &PointsRequest;
}

impl SampleRequest for PointsRequest {
    fn sample(&self) -> &PointsRequest {
        self
    }
}

impl SampleRequest for SplineRequest {
    fn sample(&self) -> &PointsRequest {
        &self.points
    }
}

/// Lagrange form of the interpolating polynomial.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LagrangeSolution {
    pub polynomial: String,
    pub coefficients: Vec<Value>,
    /// The basis polynomial `L_i(x)` for each sample point.
    pub lagrange_polynomials: Vec<String>,
}

/// Newton form of the interpolating polynomial.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewtonSolution {
    pub polynomial: String,
    pub coefficients: Vec<Value>,
    /// One row per sample point: `x_i`, `f[x_i]`, then the divided differences.
    pub difference_table: Vec<Vec<Value>>,
}

/// Interpolating polynomial found by solving the Vandermonde system.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VandermondeSolution {
    pub polynomial: String,
    pub coefficients: Vec<Value>,
    pub vandermonde_matrix: Vec<Vec<Value>>,
}

/// One piece of a spline and the interval it covers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SplinePiece {
    pub function: String,
    /// Written as `lo <= x <= hi`.
    pub interval: String,
}

impl SplinePiece {
    /// Parses the `lo <= x <= hi` interval into its bounds.
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let mut parts = self.interval.split("<=").map(str::trim);
        let lo = parts.next()?.parse().ok()?;
        if parts.next()? != "x" {
            return None;
        }
        let hi = parts.next()?.parse().ok()?;
        parts.next().is_none().then_some((lo, hi))
    }
}

/// Piecewise spline returned by the spline method.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SplineSolution {
    pub functions: Vec<SplinePiece>,
    /// One row of coefficients per piece.
    pub coefficients: Vec<Vec<Value>>,
}

macro_rules! points_method {
    ($name:ident, $label:literal, $path:literal, $response:ty) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Method for $name {
            const NAME: &'static str = $label;
            const PATH: &'static str = $path;
            const FAMILY: Family = Family::Interpolation;

            type Request = PointsRequest;
            type Response = $response;

            fn extract(form: &Form) -> Result<Self::Request, FormError> {
                PointsRequest::extract(form)
            }
        }
    };
}

points_method!(Lagrange, "Lagrange", "interpolation/lagrange", LagrangeSolution);
points_method!(Newton, "Newton divided differences", "interpolation/newton", NewtonSolution);
points_method!(Vandermonde, "Vandermonde", "interpolation/vandermonde", VandermondeSolution);

/// Piecewise linear or cubic spline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spline;

impl Method for Spline {
    const NAME: &'static str = "Spline";
    const PATH: &'static str = "interpolation/spline";
    const FAMILY: Family = Family::Interpolation;

    type Request = SplineRequest;
    type Response = SplineSolution;

    fn extract(form: &Form) -> Result<Self::Request, FormError> {
        Ok(SplineRequest {
            points: PointsRequest::extract(form)?,
            degree: form.choice("degree")?,
        })
    }
}
