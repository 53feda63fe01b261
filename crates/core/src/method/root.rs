//! Root-finding methods.
//!
//! Every root-finding request shares the [`Criteria`] fields and adds the
//! starting values its method needs. All of them answer with an
//! [`IterationTable`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ErrorType, Family, Method};
use crate::{
    cell::cell_number,
    form::{Form, FormError},
    symbolic,
};

/// Stopping criteria and output settings shared by every root-finding method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criteria {
    /// The function whose root is sought, in the service's expression syntax.
    pub expression: String,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub error_type: ErrorType,
    /// Number of significant digits in the service's output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl Criteria {
    /// Reads the shared fields from a form.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or malformed.
    pub fn extract(form: &Form) -> Result<Self, FormError> {
        Ok(Self {
            expression: form.text("expression")?,
            tolerance: form.number("tolerance")?,
            max_iterations: form.integer("max_iterations")?,
            error_type: form.choice("error_type")?,
            precision: form.optional_integer("precision")?,
        })
    }
}

/// Reads a derivative field, differentiating `expression` `order` times when
/// the field is blank.
fn derivative(
    form: &Form,
    field: &str,
    expression: &str,
    order: usize,
) -> Result<String, FormError> {
    match form.field(field) {
        Some(given) => Ok(given.to_owned()),
        None => symbolic::derivative(expression, order).map_err(|source| {
            FormError::Underivable {
                field: field.to_owned(),
                source,
            }
        }),
    }
}

/// Access to the expressions a root-finding request carries.
pub trait RootRequest {
    fn criteria(&self) -> &Criteria;

    /// Additional named functions worth plotting next to `f(x)`.
    fn auxiliary(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }
}

/// Request for bracketing methods that search within `[initial, final]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketRequest {
    #[serde(flatten)]
    pub criteria: Criteria,
    pub initial: f64,
    #[serde(rename = "final")]
    pub end: f64,
}

impl BracketRequest {
    fn extract(form: &Form) -> Result<Self, FormError> {
        Ok(Self {
            criteria: Criteria::extract(form)?,
            initial: form.number("initial")?,
            end: form.number("final")?,
        })
    }
}

impl RootRequest for BracketRequest {
    fn criteria(&self) -> &Criteria {
        &self.criteria
    }
}

/// Request for fixed-point iteration `x = g(x)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedPointRequest {
    #[serde(flatten)]
    pub criteria: Criteria,
    pub g_expression: String,
    pub initial: f64,
}

impl RootRequest for FixedPointRequest {
    fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    fn auxiliary(&self) -> Vec<(&'static str, &str)> {
        vec![("g", &self.g_expression)]
    }
}

/// Request for Newton-Raphson iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewtonRequest {
    #[serde(flatten)]
    pub criteria: Criteria,
    pub derivative_expression: String,
    pub initial: f64,
}

impl RootRequest for NewtonRequest {
    fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    fn auxiliary(&self) -> Vec<(&'static str, &str)> {
        vec![("g", &self.derivative_expression)]
    }
}

/// Request for the secant method, seeded with two starting points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecantRequest {
    #[serde(flatten)]
    pub criteria: Criteria,
    pub initial: f64,
    pub second_initial: f64,
}

impl RootRequest for SecantRequest {
    fn criteria(&self) -> &Criteria {
        &self.criteria
    }
}

/// Request for Newton's method modified for a root of known multiplicity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplicityRequest {
    #[serde(flatten)]
    pub criteria: Criteria,
    pub derivative_expression: String,
    pub initial: f64,
    pub multiplicity: u32,
}

impl RootRequest for MultiplicityRequest {
    fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    fn auxiliary(&self) -> Vec<(&'static str, &str)> {
        vec![("g", &self.derivative_expression)]
    }
}

/// Request for Newton's method modified with the second derivative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondDerivativeRequest {
    #[serde(flatten)]
    pub criteria: Criteria,
    pub derivative_expression: String,
    pub second_derivative_expression: String,
    pub initial: f64,
}

impl RootRequest for SecondDerivativeRequest {
    fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    fn auxiliary(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("g", &self.derivative_expression),
            ("h", &self.second_derivative_expression),
        ]
    }
}

/// The iteration history returned by every root-finding method.
///
/// The four sequences are parallel: entry `i` of each describes iteration `i`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IterationTable {
    #[serde(rename = "Iterations")]
    pub iterations: Vec<Value>,
    #[serde(rename = "Xn")]
    pub xn: Vec<Value>,
    #[serde(rename = "Fx")]
    pub fx: Vec<Value>,
    #[serde(rename = "Error")]
    pub error: Vec<Value>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

impl IterationTable {
    /// Returns `true` if all four sequences have the same length.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let n = self.iterations.len();
        self.xn.len() == n && self.fx.len() == n && self.error.len() == n
    }

    /// The last iterate, taken as the approximate root.
    #[must_use]
    pub fn root(&self) -> Option<f64> {
        self.xn.last().and_then(cell_number)
    }
}

macro_rules! root_method {
    ($(#[$doc:meta])* $name:ident, $label:literal, $path:literal, $request:ty, $extract:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Method for $name {
            const NAME: &'static str = $label;
            const PATH: &'static str = $path;
            const FAMILY: Family = Family::RootFinding;

            type Request = $request;
            type Response = IterationTable;

            fn extract(form: &Form) -> Result<Self::Request, FormError> {
                let extract: fn(&Form) -> Result<$request, FormError> = $extract;
                extract(form)
            }
        }
    };
}

root_method!(
    /// Interval halving on a sign-changing bracket.
    Bisection,
    "Bisection",
    "methods/bisection",
    BracketRequest,
    BracketRequest::extract
);

root_method!(
    /// Regula falsi on a sign-changing bracket.
    FalseRule,
    "False rule",
    "methods/false_rule",
    BracketRequest,
    BracketRequest::extract
);

root_method!(
    FixedPoint,
    "Fixed point",
    "methods/fixed_point",
    FixedPointRequest,
    |form| {
        Ok(FixedPointRequest {
            criteria: Criteria::extract(form)?,
            g_expression: form.text("g_expression")?,
            initial: form.number("initial")?,
        })
    }
);

root_method!(
    NewtonRaphson,
    "Newton-Raphson",
    "methods/newton_raphson",
    NewtonRequest,
    |form| {
        let criteria = Criteria::extract(form)?;
        Ok(NewtonRequest {
            derivative_expression: derivative(
                form,
                "derivative_expression",
                &criteria.expression,
                1,
            )?,
            initial: form.number("initial")?,
            criteria,
        })
    }
);

root_method!(
    Secant,
    "Secant",
    "methods/secant",
    SecantRequest,
    |form| {
        Ok(SecantRequest {
            criteria: Criteria::extract(form)?,
            initial: form.number("initial")?,
            second_initial: form.number("second_initial")?,
        })
    }
);

root_method!(
    /// Newton's method for roots of known multiplicity.
    FirstModifiedNewton,
    "First modified Newton",
    "methods/first_modified_newton_method",
    MultiplicityRequest,
    |form| {
        let criteria = Criteria::extract(form)?;
        Ok(MultiplicityRequest {
            derivative_expression: derivative(
                form,
                "derivative_expression",
                &criteria.expression,
                1,
            )?,
            initial: form.number("initial")?,
            multiplicity: form.integer("multiplicity")?,
            criteria,
        })
    }
);

root_method!(
    /// Newton's method for multiple roots using the second derivative.
    SecondModifiedNewton,
    "Second modified Newton",
    "methods/second_modified_newton_method",
    SecondDerivativeRequest,
    |form| {
        let criteria = Criteria::extract(form)?;
        let expression = &criteria.expression;
        Ok(SecondDerivativeRequest {
            derivative_expression: derivative(form, "derivative_expression", expression, 1)?,
            second_derivative_expression: derivative(
                form,
                "second_derivative_expression",
                expression,
                2,
            )?,
            initial: form.number("initial")?,
            criteria,
        })
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn bisection_form() -> Form {
        Form::new()
            .with_field("expression", "x**2 - 4")
            .with_field("initial", "0")
            .with_field("final", "28")
            .with_field("tolerance", "0.5e-10")
            .with_field("max_iterations", "100")
            .with_field("error_type", "Absolute")
    }

    #[test]
    fn blank_precision_is_left_out_of_the_payload() {
        let request = Bisection::extract(&bisection_form().with_field("precision", "")).unwrap();
        let payload = serde_json::to_value(&request).unwrap();

        assert_eq!(
            payload,
            json!({
                "expression": "x**2 - 4",
                "tolerance": 0.5e-10,
                "max_iterations": 100,
                "error_type": "absolute",
                "initial": 0.0,
                "final": 28.0,
            })
        );
        assert!(payload.get("precision").is_none());
    }

    #[test]
    fn given_precision_is_sent() {
        let request = Bisection::extract(&bisection_form().with_field("precision", "8")).unwrap();
        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(payload["precision"], json!(8));
    }

    #[test]
    fn missing_bound_blocks_extraction() {
        let form = bisection_form().with_field("final", "");
        assert_eq!(
            Bisection::extract(&form),
            Err(FormError::Missing {
                field: "final".to_owned()
            })
        );
    }

    #[test]
    fn unknown_error_type_is_rejected() {
        let form = bisection_form().with_field("error_type", "squared");
        assert!(matches!(
            FalseRule::extract(&form),
            Err(FormError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn newton_variants_carry_their_derivatives() {
        let form = bisection_form()
            .with_field("derivative_expression", "2*x")
            .with_field("second_derivative_expression", "2")
            .with_field("multiplicity", "2");

        let first = FirstModifiedNewton::extract(&form).unwrap();
        assert_eq!(first.multiplicity, 2);
        assert_eq!(first.auxiliary(), [("g", "2*x")]);

        let second = SecondModifiedNewton::extract(&form).unwrap();
        assert_eq!(second.auxiliary(), [("g", "2*x"), ("h", "2")]);
    }

    #[test]
    fn blank_derivatives_are_computed_from_the_expression() {
        let form = bisection_form()
            .with_field("derivative_expression", "")
            .with_field("second_derivative_expression", " ")
            .with_field("multiplicity", "2");

        let newton = NewtonRaphson::extract(&form).unwrap();
        assert_eq!(newton.derivative_expression, "2*x");
        let payload = serde_json::to_value(&newton).unwrap();
        assert_eq!(payload["derivative_expression"], json!("2*x"));

        let first = FirstModifiedNewton::extract(&form).unwrap();
        assert_eq!(first.derivative_expression, "2*x");

        let cubic = form.clone().with_field("expression", "x^3 - x - 2");
        let second = SecondModifiedNewton::extract(&cubic).unwrap();
        assert_eq!(second.derivative_expression, "3*x**2 - 1");
        assert_eq!(second.second_derivative_expression, "6*x");
    }

    #[test]
    fn given_derivative_is_kept_and_second_is_still_computed() {
        let form = bisection_form()
            .with_field("derivative_expression", "2 * x")
            .with_field("second_derivative_expression", "");
        let second = SecondModifiedNewton::extract(&form).unwrap();
        assert_eq!(second.auxiliary(), [("g", "2 * x"), ("h", "2")]);
    }

    #[test]
    fn underivable_expression_blocks_extraction() {
        let form = bisection_form()
            .with_field("expression", "x**2 - y")
            .with_field("derivative_expression", "");
        assert!(matches!(
            NewtonRaphson::extract(&form),
            Err(FormError::Underivable { ref field, .. }) if field == "derivative_expression"
        ));
    }

    #[test]
    fn secant_and_fixed_point_read_their_seeds() {
        let form = bisection_form()
            .with_field("second_initial", "1.5")
            .with_field("g_expression", "cos(x)");

        let secant = serde_json::to_value(Secant::extract(&form).unwrap()).unwrap();
        assert_eq!(secant["second_initial"], json!(1.5));

        let fixed = FixedPoint::extract(&form).unwrap();
        assert_eq!(fixed.auxiliary(), [("g", "cos(x)")]);
        assert_eq!(fixed.criteria().expression, "x**2 - 4");
    }

    #[test]
    fn iteration_table_reads_service_names() {
        let table: IterationTable = serde_json::from_value(json!({
            "Iterations": [1, 2],
            "Xn": [14.0, "2"],
            "Fx": [192.0, 0],
            "Error": [14.0, 8.881_784_197_001_252e-16],
            "Message": "2 is a root"
        }))
        .unwrap();

        assert!(table.is_consistent());
        assert_eq!(table.root(), Some(2.0));
        assert_eq!(table.message.as_deref(), Some("2 is a root"));
    }

    #[test]
    fn iteration_table_requires_every_sequence() {
        let result = serde_json::from_value::<IterationTable>(json!({
            "Iterations": [1],
            "Xn": [1.0],
            "Fx": [0.0],
        }));
        assert!(result.is_err());
    }
}
