//! Graph updates for each method.

use numera_core::{
    Method,
    method::{
        interpolation::{
            Lagrange, LagrangeSolution, Newton, NewtonSolution, PointsRequest, SampleRequest,
            Spline, SplineSolution, Vandermonde, VandermondeSolution,
        },
        linear::{
            GaussElimination, GaussSeidel, IterativeSolution, Jacobi, LuFactorization, Sor,
            SystemRequest,
        },
        root::{
            Bisection, FalseRule, FirstModifiedNewton, FixedPoint, IterationTable, NewtonRaphson,
            RootRequest, Secant, SecondModifiedNewton,
        },
    },
};

use crate::{PlotScript, PlotUpdate, Traces};

/// A method whose result can be drawn on the graphing widget.
pub trait PlotMethod: Method {
    fn plot(request: &Self::Request, response: &Self::Response) -> PlotUpdate;

    /// Convergence traces, for methods that return an iteration history.
    fn traces(_response: &Self::Response) -> Option<Traces> {
        None
    }
}

/// The function, its auxiliary functions, and the root when one was found.
fn root_script<R: RootRequest>(request: &R, table: &IterationTable) -> PlotUpdate {
    let mut script = PlotScript::new()
        .eval("Delete[f]")
        .eval(format!("f(x) = {}", request.criteria().expression));

    for (name, expression) in request.auxiliary() {
        script = script.eval(format!("{name}(x) = {expression}"));
    }

    if let Some(root) = table.root() {
        script = script
            .eval(format!("RootPoint = ({root}, f({root}))"))
            .eval("SetPointStyle(RootPoint, 3)")
            .eval("SetPointSize(RootPoint, 5)");
    }

    PlotUpdate::Draw(script)
}

macro_rules! plot_roots {
    ($($method:ty),* $(,)?) => {
        $(
            impl PlotMethod for $method {
                fn plot(request: &Self::Request, response: &IterationTable) -> PlotUpdate {
                    root_script(request, response)
                }

                fn traces(response: &IterationTable) -> Option<Traces> {
                    Some(Traces::from_iterations(response))
                }
            }
        )*
    };
}

plot_roots!(
    Bisection,
    FalseRule,
    FixedPoint,
    NewtonRaphson,
    Secant,
    FirstModifiedNewton,
    SecondModifiedNewton,
);

/// Both equations of a 2x2 system as lines; larger systems are not drawn.
fn system_script<R: SystemRequest>(request: &R) -> PlotUpdate {
    let (a, b) = (request.matrix(), request.vector());
    if a.size() != 2 {
        return PlotUpdate::Hide;
    }

    let equation = |row: usize| {
        Some(format!(
            "({}) * x + ({}) * y = {}",
            a.get(row, 0)?,
            a.get(row, 1)?,
            b.get(row)?
        ))
    };
    let (Some(first), Some(second)) = (equation(0), equation(1)) else {
        return PlotUpdate::Hide;
    };

    PlotUpdate::Draw(
        PlotScript::new()
            .reset()
            .set_visible("algebra", true)
            .eval(format!("ec1: {first}"))
            .eval(format!("ec2: {second}"))
            .coord_system(-10.0, 10.0, -10.0, 10.0),
    )
}

impl PlotMethod for GaussElimination {
    fn plot(request: &Self::Request, _response: &Self::Response) -> PlotUpdate {
        system_script(request)
    }
}

impl PlotMethod for LuFactorization {
    fn plot(request: &Self::Request, _response: &Self::Response) -> PlotUpdate {
        system_script(request)
    }
}

macro_rules! plot_iterative {
    ($($method:ty),* $(,)?) => {
        $(
            impl PlotMethod for $method {
                fn plot(request: &Self::Request, _response: &IterativeSolution) -> PlotUpdate {
                    system_script(request)
                }

                fn traces(response: &IterativeSolution) -> Option<Traces> {
                    Some(Traces::from_iterative(response))
                }
            }
        )*
    };
}

plot_iterative!(Jacobi, GaussSeidel, Sor);

fn with_points(mut script: PlotScript, sample: &PointsRequest) -> PlotScript {
    for (i, (x, y)) in sample.points().enumerate() {
        script = script.eval(format!("P{} = ({x}, {y})", i + 1));
    }
    script.coord_system(-20.0, 20.0, -20.0, 20.0)
}

fn polynomial_script(sample: &PointsRequest, polynomial: &str) -> PlotUpdate {
    let script = PlotScript::new().reset().eval(format!("f(x) = {polynomial}"));
    PlotUpdate::Draw(with_points(script, sample))
}

impl PlotMethod for Lagrange {
    fn plot(request: &PointsRequest, response: &LagrangeSolution) -> PlotUpdate {
        polynomial_script(request, &response.polynomial)
    }
}

impl PlotMethod for Newton {
    fn plot(request: &PointsRequest, response: &NewtonSolution) -> PlotUpdate {
        polynomial_script(request, &response.polynomial)
    }
}

impl PlotMethod for Vandermonde {
    fn plot(request: &PointsRequest, response: &VandermondeSolution) -> PlotUpdate {
        polynomial_script(request, &response.polynomial)
    }
}

impl PlotMethod for Spline {
    fn plot(request: &Self::Request, response: &SplineSolution) -> PlotUpdate {
        let mut script = PlotScript::new().reset();
        for (i, piece) in response.functions.iter().enumerate() {
            match piece.bounds() {
                Some((lo, hi)) => {
                    script = script.eval(format!(
                        "f{}: If({lo} <= x <= {hi}, {})",
                        i + 1,
                        piece.function
                    ));
                }
                None => tracing::warn!(interval = %piece.interval, "skipping unparsable spline interval"),
            }
        }
        PlotUpdate::Draw(with_points(script, request.sample()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use numera_core::Form;
    use serde_json::json;

    use crate::ScriptRecorder;

    fn commands(update: &PlotUpdate) -> Vec<String> {
        let mut recorder = ScriptRecorder::new();
        update.script().unwrap().apply(&mut recorder);
        recorder.commands().map(str::to_owned).collect()
    }

    fn root_form() -> Form {
        Form::new()
            .with_field("expression", "x**2 - 4")
            .with_field("g_expression", "4/x")
            .with_field("initial", "1")
            .with_field("final", "3")
            .with_field("tolerance", "1e-7")
            .with_field("max_iterations", "50")
            .with_field("error_type", "relative")
    }

    fn iterations(xn: serde_json::Value) -> IterationTable {
        serde_json::from_value(json!({
            "Iterations": [1, 2],
            "Xn": xn,
            "Fx": [0.0, 0.0],
            "Error": [1.0, 0.0]
        }))
        .unwrap()
    }

    #[test]
    fn root_is_marked_on_the_function() {
        let request = Bisection::extract(&root_form()).unwrap();
        let update = Bisection::plot(&request, &iterations(json!([2.5, "2"])));
        assert_eq!(
            commands(&update),
            [
                "Delete[f]",
                "f(x) = x**2 - 4",
                "RootPoint = (2, f(2))",
                "SetPointStyle(RootPoint, 3)",
                "SetPointSize(RootPoint, 5)",
            ]
        );
    }

    #[test]
    fn fixed_point_also_draws_g() {
        let request = FixedPoint::extract(&root_form()).unwrap();
        let update = FixedPoint::plot(&request, &iterations(json!([2.0, "n/a"])));
        assert_eq!(commands(&update), ["Delete[f]", "f(x) = x**2 - 4", "g(x) = 4/x"]);
    }

    fn system_form(a: &str, b: &str) -> Form {
        Form::new()
            .with_grid("A", a)
            .with_grid("b", b)
            .with_field("pivot_type", "0")
    }

    fn direct_solution() -> <GaussElimination as Method>::Response {
        serde_json::from_value(json!({
            "x": [[1.0, 1.0]],
            "vectorial_error": [[0.0, 0.0]],
            "absolute_error": 0.0
        }))
        .unwrap()
    }

    #[test]
    fn two_by_two_system_draws_both_lines() {
        let request = GaussElimination::extract(&system_form("2, -1; 1, 1.5", "3; -2")).unwrap();
        let update = GaussElimination::plot(&request, &direct_solution());
        let script = update.script().unwrap();

        assert_eq!(script.calls()[0], crate::WidgetCall::Reset);
        assert_eq!(
            commands(&update),
            ["ec1: (2) * x + (-1) * y = 3", "ec2: (1) * x + (1.5) * y = -2"]
        );
        assert_eq!(
            script.calls().last(),
            Some(&crate::WidgetCall::CoordSystem {
                x_min: -10.0,
                x_max: 10.0,
                y_min: -10.0,
                y_max: 10.0
            })
        );
    }

    #[test]
    fn larger_systems_hide_the_graph() {
        let request =
            GaussElimination::extract(&system_form("1, 0, 0; 0, 1, 0; 0, 0, 1", "1; 1; 1"))
                .unwrap();
        assert_eq!(
            GaussElimination::plot(&request, &direct_solution()),
            PlotUpdate::Hide
        );
    }

    #[test]
    fn interpolation_draws_polynomial_and_points() {
        let form = Form::new().with_grid("x", "-1, 0, 2").with_grid("y", "2, 1, 5");
        let request = Lagrange::extract(&form).unwrap();
        let response: LagrangeSolution = serde_json::from_value(json!({
            "polynomial": "x**2 + 1",
            "coefficients": [1, 0, 1],
            "lagrange_polynomials": []
        }))
        .unwrap();

        assert_eq!(
            commands(&Lagrange::plot(&request, &response)),
            ["f(x) = x**2 + 1", "P1 = (-1, 2)", "P2 = (0, 1)", "P3 = (2, 5)"]
        );
        assert!(Lagrange::traces(&response).is_none());
    }

    #[test]
    fn spline_pieces_are_bounded_to_their_intervals() {
        let form = Form::new()
            .with_grid("x", "-1, 0, 2")
            .with_grid("y", "2, 1, 5")
            .with_field("degree", "1");
        let request = Spline::extract(&form).unwrap();
        let response: SplineSolution = serde_json::from_value(json!({
            "functions": [
                { "function": "-x + 1", "interval": "-1 <= x <= 0" },
                { "function": "2*x + 1", "interval": "0.0 <= x <= 2.0" },
                { "function": "0", "interval": "somewhere" }
            ],
            "coefficients": [["-1", "1"], ["2", "1"]]
        }))
        .unwrap();

        let commands = commands(&Spline::plot(&request, &response));
        assert_eq!(commands[0], "f1: If(-1 <= x <= 0, -x + 1)");
        assert_eq!(commands[1], "f2: If(0 <= x <= 2, 2*x + 1)");
        assert_eq!(commands.len(), 5);
    }
}
