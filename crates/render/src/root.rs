use numera_core::{
    cell_text,
    method::root::{
        Bisection, FalseRule, FirstModifiedNewton, FixedPoint, IterationTable, NewtonRaphson,
        Secant, SecondModifiedNewton,
    },
};
use serde_json::Value;

use crate::{RenderError, RenderMethod, Rendered, Table};

const NO_MESSAGE: &str = "method finished without a message";

/// One row per iteration with the service's values shown verbatim.
pub(crate) fn iteration_table(table: &IterationTable) -> Result<Rendered, RenderError> {
    if !table.is_consistent() {
        return Err(RenderError::structure(format!(
            "iteration columns differ in length ({}, {}, {}, {})",
            table.iterations.len(),
            table.xn.len(),
            table.fx.len(),
            table.error.len()
        )));
    }

    let mut rows = Table::new(["Iteration", "Xn", "f(Xn)", "Error"]);
    for i in 0..table.iterations.len() {
        rows.push_row(vec![
            cell_text(&table.iterations[i]),
            cell_text(&table.xn[i]),
            cell_text(&table.fx[i]),
            cell_text(&table.error[i]),
        ]);
    }

    let message = table.message.as_deref().unwrap_or(NO_MESSAGE);
    Ok(Rendered::default().with_table(rows).with_message(message))
}

macro_rules! render_iterations {
    ($($method:ty),* $(,)?) => {
        $(
            impl RenderMethod for $method {
                fn render(
                    response: &IterationTable,
                    _follow_up: Option<&Value>,
                ) -> Result<Rendered, RenderError> {
                    iteration_table(response)
                }
            }
        )*
    };
}

render_iterations!(
    Bisection,
    FalseRule,
    FixedPoint,
    NewtonRaphson,
    Secant,
    FirstModifiedNewton,
    SecondModifiedNewton,
);

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::render;

    #[test]
    fn one_row_per_iteration_with_verbatim_cells() {
        let body = json!({
            "Iterations": [1, 2, 3],
            "Xn": [14.0, "7.00000", 3.5],
            "Fx": [192.0, "45.0000", 8.25],
            "Error": [null, 7.0, "3.5e+00"],
            "Message": "Approximate root found"
        });

        let rendered = render::<Bisection>(body, None).unwrap();
        let table = rendered.table.unwrap();

        assert_eq!(rendered.title, "Bisection");
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0], ["1", "14.0", "192.0", ""]);
        assert_eq!(table.rows()[1], ["2", "7.00000", "45.0000", "7.0"]);
        assert_eq!(table.rows()[2], ["3", "3.5", "8.25", "3.5e+00"]);
        assert_eq!(rendered.messages, ["Approximate root found"]);
    }

    #[test]
    fn missing_message_has_a_fallback() {
        let body = json!({ "Iterations": [], "Xn": [], "Fx": [], "Error": [] });
        let rendered = render::<Secant>(body, None).unwrap();
        assert!(rendered.table.unwrap().is_empty());
        assert_eq!(rendered.messages, [NO_MESSAGE]);
    }

    #[test]
    fn uneven_columns_are_unexpected() {
        let body = json!({ "Iterations": [1, 2], "Xn": [1.0], "Fx": [0.0, 0.0], "Error": [0.0, 0.0] });
        assert!(matches!(
            render::<NewtonRaphson>(body, None),
            Err(RenderError::UnexpectedStructure { .. })
        ));
    }

    #[test]
    fn missing_fields_are_unexpected() {
        let error = render::<FixedPoint>(json!({ "detail": "ok" }), None).unwrap_err();
        assert!(error.to_string().starts_with("unexpected response structure"));
    }
}
