use numera_core::{Form, FormError};

use crate::PlotScript;

/// The function shown when the graphing page first loads.
pub const DEFAULT_FUNCTION: &str = "x^2";

/// A user function drawn within fixed axis bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionPlot {
    /// The expression with all whitespace removed.
    pub expression: String,
    pub x_lower: f64,
    pub x_upper: f64,
    pub y_lower: f64,
    pub y_upper: f64,
}

impl FunctionPlot {
    /// Reads the expression and the four axis bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is missing or not a number, or if a lower
    /// bound is not below its upper bound.
    pub fn extract(form: &Form) -> Result<Self, FormError> {
        let expression: String = form
            .text("expression")?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let (x_lower, x_upper) = range(form, "x_lower", "x_upper")?;
        let (y_lower, y_upper) = range(form, "y_lower", "y_upper")?;

        Ok(Self {
            expression,
            x_lower,
            x_upper,
            y_lower,
            y_upper,
        })
    }

    /// Sets the axes, then replaces `f` with the expression.
    #[must_use]
    pub fn script(&self) -> PlotScript {
        PlotScript::new()
            .coord_system(self.x_lower, self.x_upper, self.y_lower, self.y_upper)
            .eval("Delete[f]")
            .eval(format!("f(x) = {}", self.expression))
    }

    /// The script run when the applet loads.
    #[must_use]
    pub fn initial_script() -> PlotScript {
        PlotScript::new().eval(format!("f(x) = {DEFAULT_FUNCTION}"))
    }
}

fn range(form: &Form, lower: &str, upper: &str) -> Result<(f64, f64), FormError> {
    let (low, high) = (form.number(lower)?, form.number(upper)?);
    if low < high {
        Ok((low, high))
    } else {
        Err(FormError::EmptyRange {
            lower: lower.to_owned(),
            upper: upper.to_owned(),
        })
    }
}
