use numera_core::{
    cell_text,
    method::interpolation::{
        Lagrange, LagrangeSolution, Newton, NewtonSolution, Spline, SplineSolution, Vandermonde,
        VandermondeSolution,
    },
};
use serde_json::Value;

use crate::{RenderError, RenderMethod, Rendered, Table, latex, text_rows, texts};

/// The polynomial and its coefficients, shared by the single-polynomial methods.
fn polynomial(polynomial: &str, coefficients: &[Value]) -> Result<Rendered, RenderError> {
    if polynomial.trim().is_empty() {
        return Err(RenderError::structure("`polynomial` is empty"));
    }

    let column: Vec<Vec<String>> = coefficients.iter().map(|c| vec![cell_text(c)]).collect();
    Ok(Rendered::default()
        .with_latex(format!("P(x) = {}", latex::polynomial(polynomial)))
        .with_latex(latex::bmatrix(&column)))
}

impl RenderMethod for Lagrange {
    fn render(response: &LagrangeSolution, _follow_up: Option<&Value>) -> Result<Rendered, RenderError> {
        let mut table = Table::new(["i", "L_i(x)"]);
        for (i, basis) in response.lagrange_polynomials.iter().enumerate() {
            table.push_row(vec![i.to_string(), basis.clone()]);
        }

        let mut rendered =
            polynomial(&response.polynomial, &response.coefficients)?.with_table(table);
        for (i, basis) in response.lagrange_polynomials.iter().enumerate() {
            rendered = rendered.with_latex(format!("L_{{{i}}}(x) = {}", latex::polynomial(basis)));
        }
        Ok(rendered)
    }
}

impl RenderMethod for Newton {
    fn render(response: &NewtonSolution, _follow_up: Option<&Value>) -> Result<Rendered, RenderError> {
        let width = response
            .difference_table
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        if width < 2 {
            return Err(RenderError::structure(
                "`difference_table` rows need `x_i` and `f[x_i]`",
            ));
        }

        let headers: Vec<String> = ["n", "x_i", "f[x_i]"]
            .into_iter()
            .map(str::to_owned)
            .chain((1..width - 1).map(|order| order.to_string()))
            .collect();

        let mut table = Table::new(headers.clone());
        for (n, row) in response.difference_table.iter().enumerate() {
            let mut cells = vec![n.to_string()];
            cells.extend(texts(row));
            table.push_row(cells);
        }

        let array = latex::array(&headers, table.rows());
        Ok(polynomial(&response.polynomial, &response.coefficients)?
            .with_table(table)
            .with_latex(array))
    }
}

impl RenderMethod for Vandermonde {
    fn render(
        response: &VandermondeSolution,
        _follow_up: Option<&Value>,
    ) -> Result<Rendered, RenderError> {
        let matrix = text_rows(&response.vandermonde_matrix);
        let Some(columns) = matrix.first().map(Vec::len) else {
            return Err(RenderError::structure("`vandermonde_matrix` is empty"));
        };

        let mut table = Table::new((1..=columns).map(|j| format!("c{j}")));
        for row in &matrix {
            table.push_row(row.clone());
        }

        Ok(polynomial(&response.polynomial, &response.coefficients)?
            .with_table(table)
            .with_latex(format!("V = {}", latex::bmatrix(&matrix))))
    }
}

impl RenderMethod for Spline {
    fn render(response: &SplineSolution, _follow_up: Option<&Value>) -> Result<Rendered, RenderError> {
        if response.functions.is_empty() {
            return Err(RenderError::structure("`functions` is empty"));
        }

        let mut table = Table::new(["Function", "Interval"]);
        let mut rendered = Rendered::default();
        for (i, piece) in response.functions.iter().enumerate() {
            table.push_row(vec![piece.function.clone(), piece.interval.clone()]);
            rendered = rendered.with_latex(format!(
                r"f_{{{}}}(x) = {}, \quad {}",
                i + 1,
                latex::polynomial(&piece.function),
                latex::interval(&piece.interval)
            ));
        }

        Ok(rendered
            .with_table(table)
            .with_latex(latex::bmatrix(&text_rows(&response.coefficients))))
    }
}
