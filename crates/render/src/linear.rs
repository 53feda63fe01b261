use numera_core::{
    cell_text,
    method::linear::{
        ConvergenceReport, DirectSolution, GaussElimination, GaussSeidel, IterativeSolution,
        Jacobi, LuFactorization, LuSolution, Sor,
    },
};
use serde_json::Value;

use crate::{RenderError, RenderMethod, Rendered, Table, latex, text_rows, texts};

const NO_MESSAGE: &str = "method finished without a convergence message";

/// The solution vector, which the service wraps in an outer sequence.
fn solution_vector(rows: &[Vec<Value>], name: &str) -> Result<Vec<String>, RenderError> {
    match rows {
        [vector] if !vector.is_empty() => Ok(texts(vector)),
        _ => Err(RenderError::structure(format!("`{name}` is not a single vector"))),
    }
}

fn direct(solution: &DirectSolution) -> Result<Rendered, RenderError> {
    let x = solution_vector(&solution.x, "x")?;
    let error = solution_vector(&solution.vectorial_error, "vectorial_error")?;

    let mut table = Table::new(["Unknown", "Value"]);
    for (i, value) in x.iter().enumerate() {
        table.push_row(vec![format!("x{}", i + 1), value.clone()]);
    }

    Ok(Rendered::default()
        .with_table(table)
        .with_latex(latex::column("x", &x))
        .with_latex(latex::column(r"\text{Vectorial error}", &error))
        .with_message(format!(
            "absolute error: {}",
            cell_text(&solution.absolute_error)
        )))
}

impl RenderMethod for GaussElimination {
    fn render(response: &DirectSolution, _follow_up: Option<&Value>) -> Result<Rendered, RenderError> {
        direct(response)
    }
}

impl RenderMethod for LuFactorization {
    fn render(response: &LuSolution, _follow_up: Option<&Value>) -> Result<Rendered, RenderError> {
        if response.l.is_empty() || response.u.is_empty() {
            return Err(RenderError::structure("`L` and `U` must not be empty"));
        }

        let mut rendered = direct(&response.solution)?;
        rendered.latex.insert(1, latex::matrix("L", &text_rows(&response.l)));
        rendered.latex.insert(2, latex::matrix("U", &text_rows(&response.u)));
        Ok(rendered)
    }
}

fn iterative(
    solution: &IterativeSolution,
    follow_up: Option<&Value>,
) -> Result<Rendered, RenderError> {
    if solution.x.is_empty() || !solution.is_consistent() {
        return Err(RenderError::structure(
            "`iterations`, `x` and `error` do not describe the same iterations",
        ));
    }

    let unknowns = (1..=solution.x.len()).map(|j| format!("X{j}"));
    let headers = ["Iteration".to_owned()]
        .into_iter()
        .chain(unknowns)
        .chain(["Error".to_owned()]);
    let mut table = Table::new(headers);

    for (i, iteration) in solution.iterations.iter().enumerate() {
        let mut row = vec![cell_text(iteration)];
        row.extend(solution.x.iter().map(|column| cell_text(&column[i])));
        row.push(cell_text(&solution.error[i]));
        table.push_row(row);
    }

    let mut rendered = Rendered::default().with_table(table);

    let last: Vec<String> = solution
        .x
        .iter()
        .filter_map(|column| column.last().map(cell_text))
        .collect();
    if last.len() == solution.x.len() {
        rendered = rendered.with_latex(latex::column("x", &last));
    }

    rendered = rendered.with_message(solution.message.as_deref().unwrap_or(NO_MESSAGE));

    if let Some(body) = follow_up {
        rendered.messages.extend(convergence(body)?);
    }
    Ok(rendered)
}

fn convergence(body: &Value) -> Result<Vec<String>, RenderError> {
    let report: ConvergenceReport = serde_json::from_value(body.clone())
        .map_err(|error| RenderError::structure(error.to_string()))?;

    let mut lines = Vec::new();
    if let Some(radius) = &report.spectral_radius {
        lines.push(format!("spectral radius: {}", cell_text(radius)));
    }
    if let Some(convergence) = report.convergence {
        lines.push(format!("convergence: {convergence}"));
    }

    if lines.is_empty() {
        return Err(RenderError::structure(
            "convergence report has neither `spectral_radius` nor `convergence`",
        ));
    }
    Ok(lines)
}

macro_rules! render_iterative {
    ($($method:ty),* $(,)?) => {
        $(
            impl RenderMethod for $method {
                fn render(
                    response: &IterativeSolution,
                    follow_up: Option<&Value>,
                ) -> Result<Rendered, RenderError> {
                    iterative(response, follow_up)
                }
            }
        )*
    };
}

render_iterative!(Jacobi, GaussSeidel, Sor);
