use numera_core::{
    cell_number,
    method::{linear::IterativeSolution, root::IterationTable},
};
use serde_json::Value;

/// A named series of `[x, y]` points.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Convergence traces collected from an iteration history, plotted against
/// the iteration number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traces {
    traces: Vec<Trace>,
}

impl Traces {
    /// Creates empty traces with the given names.
    #[must_use]
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            traces: names
                .into_iter()
                .map(|name| Trace {
                    name: name.into(),
                    points: Vec::new(),
                })
                .collect(),
        }
    }

    /// Records one x value across all traces.
    ///
    /// A `None` slot skips that trace for this x.
    pub fn record(&mut self, x: f64, ys: &[Option<f64>]) {
        for (trace, y) in self.traces.iter_mut().zip(ys) {
            if let Some(y) = y {
                trace.points.push([x, *y]);
            }
        }
    }

    /// The iterate and error of a root-finding history.
    #[must_use]
    pub fn from_iterations(table: &IterationTable) -> Self {
        let mut traces = Self::new(["Xn", "Error"]);
        for (i, iteration) in table.iterations.iter().enumerate() {
            if let Some(x) = cell_number(iteration) {
                traces.record(x, &[at(&table.xn, i), at(&table.error, i)]);
            }
        }
        traces
    }

    /// Every unknown and the error of an iterative linear-system history.
    #[must_use]
    pub fn from_iterative(solution: &IterativeSolution) -> Self {
        let names = (1..=solution.x.len())
            .map(|j| format!("X{j}"))
            .chain(["Error".to_owned()]);
        let mut traces = Self::new(names);

        for (i, iteration) in solution.iterations.iter().enumerate() {
            if let Some(x) = cell_number(iteration) {
                let ys: Vec<_> = solution
                    .x
                    .iter()
                    .map(|column| at(column, i))
                    .chain([at(&solution.error, i)])
                    .collect();
                traces.record(x, &ys);
            }
        }
        traces
    }

    #[must_use]
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Returns `true` if no trace has a point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|trace| trace.points.is_empty())
    }
}

fn at(values: &[Value], i: usize) -> Option<f64> {
    values.get(i).and_then(cell_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn root_history_skips_missing_errors() {
        let table: IterationTable = serde_json::from_value(json!({
            "Iterations": [1, 2, 3],
            "Xn": [14.0, "7", 3.5],
            "Fx": [192.0, 45.0, 8.25],
            "Error": [null, 7.0, "3.5"]
        }))
        .unwrap();

        let traces = Traces::from_iterations(&table);
        let [xn, error] = traces.traces() else {
            panic!("expected two traces");
        };

        assert_eq!(xn.points, [[1.0, 14.0], [2.0, 7.0], [3.0, 3.5]]);
        assert_eq!(error.points.len(), 2);
        assert_relative_eq!(error.points[1][1], 3.5);
    }

    #[test]
    fn iterative_history_has_one_trace_per_unknown() {
        let solution: IterativeSolution = serde_json::from_value(json!({
            "iterations": [0, 1],
            "x": [["0", "0.75"], ["0", "0.2"]],
            "error": [null, "0.75"]
        }))
        .unwrap();

        let traces = Traces::from_iterative(&solution);
        let names: Vec<_> = traces.traces().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["X1", "X2", "Error"]);
        assert_eq!(traces.traces()[1].points, [[0.0, 0.0], [1.0, 0.2]]);
        assert!(!traces.is_empty());
    }

    #[test]
    fn unnumbered_iterations_are_skipped() {
        let table: IterationTable = serde_json::from_value(json!({
            "Iterations": ["-", "-"],
            "Xn": [1.0, 2.0],
            "Fx": [0.0, 0.0],
            "Error": [0.0, 0.0]
        }))
        .unwrap();
        assert!(Traces::from_iterations(&table).is_empty());
    }
}
