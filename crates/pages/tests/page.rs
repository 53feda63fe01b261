use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use numera_client::{ApiClient, ClientConfig};
use numera_core::{
    Form, PageState,
    method::{
        interpolation::Spline,
        linear::{GaussElimination, Jacobi},
        root::Bisection,
    },
};
use numera_pages::{Page, PageError};
use numera_plot::{PlotUpdate, ScriptRecorder, SvgError, WidgetCall};
use numera_render::MemorySurface;
use serde_json::{Value, json};
use warp::{Filter, http::StatusCode};

type Posted = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

/// Starts a fake service; `reply` answers each POST by path.
fn start(token: bool, reply: fn(&str, &Value) -> (StatusCode, Value)) -> (SocketAddr, Posted) {
    let posted = Posted::default();

    let config = warp::get()
        .and(warp::path("config"))
        .and(warp::path::end())
        .map(move || {
            if token {
                warp::reply::with_status(
                    json!({ "token_type": "Bearer", "access_token": "t0k" }).to_string(),
                    StatusCode::OK,
                )
            } else {
                warp::reply::with_status(String::new(), StatusCode::SERVICE_UNAVAILABLE)
            }
        });

    let log = posted.clone();
    let methods = warp::post()
        .and(warp::path::full())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json::<Value>())
        .map(move |path: warp::path::FullPath, auth: Option<String>, body: Value| {
            let (status, reply_body) = reply(path.as_str(), &body);
            log.lock().unwrap().push((path.as_str().to_owned(), auth, body));
            warp::reply::with_status(reply_body.to_string(), status)
        });

    let (addr, server) = warp::serve(config.or(methods)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, posted)
}

fn page(addr: SocketAddr) -> Page<MemorySurface, ScriptRecorder> {
    let client = ApiClient::new(&ClientConfig {
        api_base: format!("http://{addr}/api"),
        config_url: format!("http://{addr}/config"),
    });
    Page::new(client, MemorySurface::default(), ScriptRecorder::new())
}

fn bisection_form() -> Form {
    Form::new()
        .with_field("expression", "x**2 - 4")
        .with_field("initial", "0")
        .with_field("final", "28")
        .with_field("tolerance", "1e-7")
        .with_field("max_iterations", "100")
        .with_field("error_type", "absolute")
        .with_field("precision", "")
}

fn root_history(_: &str, _: &Value) -> (StatusCode, Value) {
    let body = json!({
        "Iterations": [1, 2, 3],
        "Xn": [14.0, 7.0, "2.0000000"],
        "Fx": [192.0, 45.0, "0.0"],
        "Error": [14.0, 7.0, 5.0],
        "Message": "2.0000000 is an approximate root"
    });
    (StatusCode::OK, body)
}

#[tokio::test]
async fn root_finding_renders_table_and_marks_the_root() {
    let (addr, posted) = start(true, root_history);
    let mut page = page(addr);

    page.load().await;
    assert_eq!(page.state(), PageState::Ready);

    let submission = page.submit::<Bisection>(&bisection_form()).await.unwrap();
    assert_eq!(page.state(), PageState::Ready);

    let shown = page.surface().shown.as_ref().unwrap();
    let table = shown.table.as_ref().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows()[2], ["3", "2.0000000", "0.0", "5.0"]);
    assert_eq!(page.surface().error, None);

    let commands: Vec<_> = page.widget().commands().collect();
    assert!(commands.contains(&"RootPoint = (2, f(2))"));
    assert!(page.plot_visible());
    assert!(submission.traces.is_some());

    let posted = posted.lock().unwrap();
    assert_eq!(posted[0].0, "/api/methods/bisection/");
    assert_eq!(posted[0].1.as_deref(), Some("Bearer t0k"));
    assert!(posted[0].2.get("precision").is_none());
}

#[tokio::test]
async fn submitting_before_load_uses_whatever_credential_resolves() {
    fn unauthorized(_: &str, _: &Value) -> (StatusCode, Value) {
        (StatusCode::UNAUTHORIZED, json!({ "detail": "Not authenticated" }))
    }

    let (addr, posted) = start(false, unauthorized);
    let mut page = page(addr);
    assert_eq!(page.state(), PageState::Idle);

    let result = page.submit::<Bisection>(&bisection_form()).await;

    assert!(matches!(result, Err(PageError::Api(_))));
    assert_eq!(page.surface().error.as_deref(), Some("Not authenticated"));
    assert_eq!(page.state(), PageState::Ready);
    assert_eq!(posted.lock().unwrap()[0].1, None);
}

#[tokio::test]
async fn validation_failure_sends_nothing() {
    let (addr, posted) = start(true, root_history);
    let mut page = page(addr);
    page.load().await;

    let form = bisection_form().with_field("tolerance", "small");
    let result = page.submit::<Bisection>(&form).await;

    assert!(matches!(result, Err(PageError::Form(_))));
    assert!(page.surface().error.as_deref().unwrap().contains("tolerance"));
    assert!(posted.lock().unwrap().is_empty());
    assert_eq!(page.state(), PageState::Ready);
}

#[tokio::test]
async fn detail_list_reaches_the_surface_verbatim() {
    fn rejected(_: &str, _: &Value) -> (StatusCode, Value) {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "detail": [{ "loc": ["body", "final"], "msg": "Y", "type": "value_error" }] }),
        )
    }

    let (addr, _) = start(true, rejected);
    let mut page = page(addr);
    page.submit::<Bisection>(&bisection_form()).await.unwrap_err();
    assert_eq!(page.surface().error.as_deref(), Some("Y"));
    assert_eq!(page.surface().shown, None);
}

#[tokio::test]
async fn malformed_success_is_an_unexpected_structure() {
    fn partial(_: &str, _: &Value) -> (StatusCode, Value) {
        (StatusCode::OK, json!({ "Iterations": [1], "Xn": [1.0] }))
    }

    let (addr, _) = start(true, partial);
    let mut page = page(addr);
    let result = page.submit::<Bisection>(&bisection_form()).await;

    assert!(matches!(result, Err(PageError::Render(_))));
    let error = page.surface().error.clone().unwrap();
    assert!(error.starts_with("unexpected response structure"));
}

#[tokio::test]
async fn validation_failure_replaces_the_previous_result() {
    let (addr, posted) = start(true, root_history);
    let mut page = page(addr);
    page.submit::<Bisection>(&bisection_form()).await.unwrap();
    assert!(page.surface().shown.is_some());

    let form = bisection_form().with_field("max_iterations", "many");
    page.submit::<Bisection>(&form).await.unwrap_err();

    assert_eq!(page.surface().shown, None);
    assert!(page.surface().error.as_deref().unwrap().contains("max_iterations"));
    assert!(!page.plot_visible());
    assert_eq!(posted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_submission_hides_the_previous_graph() {
    fn singular_or_solved(_: &str, body: &Value) -> (StatusCode, Value) {
        if body["A"] == json!([[1.0, 2.0], [2.0, 4.0]]) {
            return (StatusCode::BAD_REQUEST, json!({ "detail": "matrix is singular" }));
        }
        let body = json!({
            "x": [[1.0, 1.0]],
            "vectorial_error": [[0.0, 0.0]],
            "absolute_error": 0.0
        });
        (StatusCode::OK, body)
    }

    let (addr, _) = start(true, singular_or_solved);
    let client = ApiClient::new(&ClientConfig {
        api_base: format!("http://{addr}/api"),
        config_url: format!("http://{addr}/config"),
    });
    let widget = ScriptRecorder::new().with_svg("<svg></svg>");
    let mut page = Page::new(client, MemorySurface::default(), widget);

    let solvable = Form::new()
        .with_grid("A", "2, 1; 1, 3")
        .with_grid("b", "3; 4")
        .with_field("pivot_type", "2");
    page.submit::<GaussElimination>(&solvable).await.unwrap();
    assert!(page.plot_visible());

    let singular = solvable.with_grid("A", "1, 2; 2, 4");
    page.submit::<GaussElimination>(&singular).await.unwrap_err();

    assert_eq!(page.surface().error.as_deref(), Some("matrix is singular"));
    assert!(!page.plot_visible());
    assert!(matches!(
        page.export_svg(std::path::Path::new("unused.svg")),
        Err(SvgError::Unavailable)
    ));
}

#[tokio::test]
async fn identity_system_posts_exact_matrix_and_vector() {
    fn solved(_: &str, _: &Value) -> (StatusCode, Value) {
        let body = json!({
            "x": [[1.0, 1.0]],
            "vectorial_error": [[0.0, 0.0]],
            "absolute_error": 0.0
        });
        (StatusCode::OK, body)
    }

    let (addr, posted) = start(true, solved);
    let mut page = page(addr);
    let form = Form::new()
        .with_grid("A", "1, 0; 0, 1")
        .with_grid("b", "1; 1")
        .with_field("pivot_type", "2");

    page.submit::<GaussElimination>(&form).await.unwrap();

    let posted = posted.lock().unwrap();
    assert_eq!(posted[0].0, "/api/linear_equations_system/gauss_elimination/");
    assert_eq!(posted[0].2["A"], json!([[1.0, 0.0], [0.0, 1.0]]));
    assert_eq!(posted[0].2["b"], json!([[1.0], [1.0]]));
    assert!(page.widget().calls().contains(&WidgetCall::Reset));
}

#[tokio::test]
async fn iterative_system_adds_convergence_report_and_hides_large_graphs() {
    fn jacobi(path: &str, _: &Value) -> (StatusCode, Value) {
        if path.ends_with("/spectral_radius_and_convergence/") {
            let body = json!({ "spectral_radius": 0.5, "convergence": "converges" });
            return (StatusCode::OK, body);
        }
        let body = json!({
            "iterations": [0, 1],
            "x": [["0", "0.25"], ["0", "0.2"], ["0", "0.5"]],
            "error": [null, "0.5"],
            "message": "tolerance reached"
        });
        (StatusCode::OK, body)
    }

    let (addr, posted) = start(true, jacobi);
    let mut page = page(addr);
    let form = Form::new()
        .with_grid("A", "4, 1, 0; 1, 5, 1; 0, 1, 2")
        .with_grid("b", "1; 1; 1")
        .with_grid("x_initial", "0; 0; 0")
        .with_field("error_type", "absolute")
        .with_field("method_type", "iterative");

    let submission = page.submit::<Jacobi>(&form).await.unwrap();

    assert_eq!(submission.plot, PlotUpdate::Hide);
    assert!(!page.plot_visible());
    assert!(matches!(
        page.export_svg(std::path::Path::new("unused.svg")),
        Err(SvgError::Unavailable)
    ));

    let messages = &page.surface().shown.as_ref().unwrap().messages;
    assert_eq!(
        messages,
        &["tolerance reached", "spectral radius: 0.5", "convergence: converges"]
    );

    let posted = posted.lock().unwrap();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[0].2, posted[1].2);
}

#[tokio::test]
async fn failed_follow_up_is_reported_like_the_first_call() {
    fn no_report(path: &str, _: &Value) -> (StatusCode, Value) {
        if path.ends_with("/spectral_radius_and_convergence/") {
            return (StatusCode::BAD_REQUEST, json!({ "detail": "matrix is singular" }));
        }
        let body = json!({ "iterations": [0], "x": [["0"], ["0"]], "error": [null] });
        (StatusCode::OK, body)
    }

    let (addr, _) = start(true, no_report);
    let mut page = page(addr);
    let form = Form::new()
        .with_grid("A", "1, 2; 3, 4")
        .with_grid("b", "1; 1")
        .with_grid("x_initial", "0; 0")
        .with_field("error_type", "relative")
        .with_field("method_type", "matrix");

    page.submit::<Jacobi>(&form).await.unwrap_err();
    assert_eq!(page.surface().error.as_deref(), Some("matrix is singular"));
}

#[tokio::test]
async fn malformed_first_response_skips_the_follow_up() {
    fn garbled(_: &str, _: &Value) -> (StatusCode, Value) {
        (StatusCode::OK, json!({ "iterations": "none" }))
    }

    let (addr, posted) = start(true, garbled);
    let mut page = page(addr);
    let form = Form::new()
        .with_grid("A", "4, 1; 1, 3")
        .with_grid("b", "1; 2")
        .with_grid("x_initial", "0; 0")
        .with_field("error_type", "absolute")
        .with_field("method_type", "iterative");

    let result = page.submit::<Jacobi>(&form).await;

    assert!(matches!(result, Err(PageError::Render(_))));
    assert_eq!(posted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn spline_draws_pieces_and_exports_svg() {
    fn spline(_: &str, _: &Value) -> (StatusCode, Value) {
        let body = json!({
            "functions": [
                { "function": "-x + 1", "interval": "-1 <= x <= 0" },
                { "function": "2*x + 1", "interval": "0 <= x <= 2" }
            ],
            "coefficients": [["-1", "1"], ["2", "1"]]
        });
        (StatusCode::OK, body)
    }

    let (addr, _) = start(true, spline);
    let client = ApiClient::new(&ClientConfig {
        api_base: format!("http://{addr}/api"),
        config_url: format!("http://{addr}/config"),
    });
    let widget = ScriptRecorder::new().with_svg("<svg></svg>");
    let mut page = Page::new(client, MemorySurface::default(), widget);

    let form = Form::new()
        .with_grid("x", "-1, 0, 2")
        .with_grid("y", "2, 1, 5")
        .with_field("degree", "1");
    page.submit::<Spline>(&form).await.unwrap();

    let commands: Vec<_> = page.widget().commands().collect();
    assert_eq!(commands[0], "f1: If(-1 <= x <= 0, -x + 1)");
    assert_eq!(commands[4], "P3 = (2, 5)");

    let path = std::env::temp_dir().join(format!("numera-page-{}.svg", std::process::id()));
    page.export_svg(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg></svg>");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn function_plot_draws_without_a_request() {
    let mut page = page(SocketAddr::from(([127, 0, 0, 1], 9)));
    let form = Form::new()
        .with_field("expression", "sqrt(x) * sin(2*x)")
        .with_field("x_lower", "0")
        .with_field("x_upper", "10")
        .with_field("y_lower", "-4")
        .with_field("y_upper", "4");

    let plot = page.plot_function(&form).unwrap();
    assert_eq!(plot.expression, "sqrt(x)*sin(2*x)");

    let commands: Vec<_> = page.widget().commands().collect();
    assert_eq!(commands, ["Delete[f]", "f(x) = sqrt(x)*sin(2*x)"]);
    assert!(page.plot_visible());

    let shown = page.surface().shown.as_ref().unwrap();
    assert_eq!(shown.latex, [r"f(x) = \sqrt{x} \cdot \sin(2 \cdot x)"]);
    assert_eq!(page.state(), PageState::Idle);

    let inverted = form.with_field("x_upper", "-1");
    assert!(matches!(page.plot_function(&inverted), Err(PageError::Form(_))));
    assert!(page.surface().shown.is_none());
    assert!(!page.plot_visible());
}
