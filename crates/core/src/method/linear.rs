//! Linear-system methods.
//!
//! Direct solvers ([`GaussElimination`], [`LuFactorization`]) return the
//! solution and its residual error in one call. Iterative solvers
//! ([`Jacobi`], [`GaussSeidel`], [`Sor`]) return an iteration history; Jacobi
//! and Gauss-Seidel also expose a follow-up endpoint reporting the spectral
//! radius of the iteration matrix.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ErrorType, Family, Method};
use crate::{
    form::{Choice, Form, FormError},
    linalg::{ColumnVector, Matrix},
};

/// Tolerance used when the form leaves it blank.
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Iteration cap used when the form leaves it blank.
pub const DEFAULT_MAX_ITER: u32 = 100;

/// How an iterative method is evaluated on the service side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodType {
    /// Component-by-component updates.
    Iterative,
    /// Updates through the iteration matrix `T` and vector `C`.
    Matrix,
}

impl Choice for MethodType {
    const EXPECTED: &'static str = "`iterative` or `matrix`";

    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "iterative" => Some(Self::Iterative),
            "matrix" => Some(Self::Matrix),
            _ => None,
        }
    }
}

/// Access to the system `Ax = b` a request describes.
pub trait SystemRequest {
    fn matrix(&self) -> &Matrix;
    fn vector(&self) -> &ColumnVector;
}

/// Request for the direct solvers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectRequest {
    #[serde(rename = "A")]
    pub a: Matrix,
    pub b: ColumnVector,
    /// Pivoting strategy selector (0 none, 1 partial, 2 total).
    pub pivot_type: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl DirectRequest {
    fn extract(form: &Form) -> Result<Self, FormError> {
        let a = form.matrix("A")?;
        let b = form.column("b", a.size())?;
        Ok(Self {
            a,
            b,
            pivot_type: form.integer("pivot_type")?,
            order: form.optional_integer("order")?,
            precision: form.optional_integer("precision")?,
        })
    }
}

impl SystemRequest for DirectRequest {
    fn matrix(&self) -> &Matrix {
        &self.a
    }

    fn vector(&self) -> &ColumnVector {
        &self.b
    }
}

/// Request for the iterative solvers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterativeRequest {
    #[serde(rename = "A")]
    pub a: Matrix,
    pub b: ColumnVector,
    pub x_initial: ColumnVector,
    pub tol: f64,
    pub max_iter: u32,
    pub error_type: ErrorType,
    pub method_type: MethodType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Relaxation factor, only sent for successive over-relaxation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
}

impl IterativeRequest {
    fn extract(form: &Form) -> Result<Self, FormError> {
        let a = form.matrix("A")?;
        let b = form.column("b", a.size())?;
        let x_initial = form.column("x_initial", a.size())?;
        Ok(Self {
            a,
            b,
            x_initial,
            tol: form.number_or("tol", DEFAULT_TOLERANCE)?,
            max_iter: form.integer_or("max_iter", DEFAULT_MAX_ITER)?,
            error_type: form.choice("error_type")?,
            method_type: form.choice("method_type")?,
            order: form.optional_integer("order")?,
            precision: form.optional_integer("precision")?,
            w: None,
        })
    }
}

impl SystemRequest for IterativeRequest {
    fn matrix(&self) -> &Matrix {
        &self.a
    }

    fn vector(&self) -> &ColumnVector {
        &self.b
    }
}

/// Solution returned by Gaussian elimination.
///
/// Vectors arrive wrapped in an outer sequence: `x` is `[[x1, x2, ...]]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectSolution {
    pub x: Vec<Vec<Value>>,
    pub vectorial_error: Vec<Vec<Value>>,
    pub absolute_error: Value,
}

/// Solution returned by LU factorization, including the factors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LuSolution {
    #[serde(flatten)]
    pub solution: DirectSolution,
    #[serde(rename = "L")]
    pub l: Vec<Vec<Value>>,
    #[serde(rename = "U")]
    pub u: Vec<Vec<Value>>,
}

/// Iteration history returned by the iterative solvers.
///
/// `x[j][i]` is unknown `j` at iteration `i`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IterativeSolution {
    pub iterations: Vec<Value>,
    pub x: Vec<Vec<Value>>,
    pub error: Vec<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl IterativeSolution {
    /// Returns `true` if every unknown and the error have one entry per iteration.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let n = self.iterations.len();
        self.error.len() == n && self.x.iter().all(|column| column.len() == n)
    }
}

/// The follow-up report on whether an iterative method converges.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConvergenceReport {
    #[serde(default)]
    pub spectral_radius: Option<Value>,
    #[serde(default)]
    pub convergence: Option<String>,
}

/// Gaussian elimination with optional pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussElimination;

impl Method for GaussElimination {
    const NAME: &'static str = "Gaussian elimination";
    const PATH: &'static str = "linear_equations_system/gauss_elimination";
    const FAMILY: Family = Family::LinearSystem;

    type Request = DirectRequest;
    type Response = DirectSolution;

    fn extract(form: &Form) -> Result<Self::Request, FormError> {
        DirectRequest::extract(form)
    }
}

/// LU factorization with optional pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuFactorization;

impl Method for LuFactorization {
    const NAME: &'static str = "LU factorization";
    const PATH: &'static str = "linear_equations_system/lu_factorization";
    const FAMILY: Family = Family::LinearSystem;

    type Request = DirectRequest;
    type Response = LuSolution;

    fn extract(form: &Form) -> Result<Self::Request, FormError> {
        DirectRequest::extract(form).map(|request| DirectRequest {
            order: None,
            ..request
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Jacobi;

impl Method for Jacobi {
    const NAME: &'static str = "Jacobi";
    const PATH: &'static str = "linear_equations_system/jacobi";
    const FAMILY: Family = Family::LinearSystem;
    const FOLLOW_UP: Option<&'static str> =
        Some("linear_equations_system/jacobi/spectral_radius_and_convergence");

    type Request = IterativeRequest;
    type Response = IterativeSolution;

    fn extract(form: &Form) -> Result<Self::Request, FormError> {
        IterativeRequest::extract(form)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GaussSeidel;

impl Method for GaussSeidel {
    const NAME: &'static str = "Gauss-Seidel";
    const PATH: &'static str = "linear_equations_system/gauss_seidel";
    const FAMILY: Family = Family::LinearSystem;
    const FOLLOW_UP: Option<&'static str> =
        Some("linear_equations_system/gauss_seidel/spectral_radius_and_convergence");

    type Request = IterativeRequest;
    type Response = IterativeSolution;

    fn extract(form: &Form) -> Result<Self::Request, FormError> {
        IterativeRequest::extract(form)
    }
}

/// Successive over-relaxation, Gauss-Seidel weighted by the factor `w`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sor;

impl Method for Sor {
    const NAME: &'static str = "Successive over-relaxation";
    const PATH: &'static str = "linear_equations_system/sor";
    const FAMILY: Family = Family::LinearSystem;

    type Request = IterativeRequest;
    type Response = IterativeSolution;

    fn extract(form: &Form) -> Result<Self::Request, FormError> {
        let w = form.number("w")?;
        IterativeRequest::extract(form).map(|request| IterativeRequest {
            w: Some(w),
            ..request
        })
    }
}
