use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use numera_client::{ApiClient, ClientConfig};
use numera_core::{
    Form, MethodKind,
    method::{interpolation, linear, root},
    parse_grid,
};
use numera_pages::{Page, PageMethod, Submission};
use numera_plot::{AppletConfig, DEFAULT_SVG_NAME, PlotUpdate, ScriptRecorder};
use numera_render::TerminalSurface;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "numera")]
#[command(about = "Client for a remote numerical-methods service")]
#[command(version)]
struct Cli {
    /// TOML file with `api_base` and `config_url`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a form to a method and print the result
    Run(RunArgs),
    /// Plot a function within fixed axis bounds
    Graph(GraphArgs),
    /// List the available methods
    Methods,
    /// Validate an exported SVG and save it
    ExportSvg {
        input: PathBuf,
        #[arg(long, short, default_value = DEFAULT_SVG_NAME)]
        output: PathBuf,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Method name, as listed by `numera methods`
    method: MethodKind,

    /// Form field, `name=value`
    #[arg(short = 'f', long = "field", value_parser = parse_assignment)]
    fields: Vec<(String, String)>,

    /// Cell grid, `name=rows` with rows split by `;` and cells by `,`
    #[arg(short = 'g', long = "grid", value_parser = parse_assignment)]
    grids: Vec<(String, String)>,

    /// Write the graphing-applet script to this file
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write the applet embed configuration (JSON) to this file
    #[arg(long)]
    applet: Option<PathBuf>,

    /// Open a window with the convergence traces (needs the `native` feature)
    #[arg(long)]
    show: bool,
}

#[derive(clap::Args)]
struct GraphArgs {
    /// Function of `x`, such as `sqrt(x) * sin(2*x)`
    expression: String,

    #[arg(long, allow_hyphen_values = true, default_value = "-10")]
    x_lower: String,
    #[arg(long, allow_hyphen_values = true, default_value = "10")]
    x_upper: String,
    #[arg(long, allow_hyphen_values = true, default_value = "-10")]
    y_lower: String,
    #[arg(long, allow_hyphen_values = true, default_value = "10")]
    y_upper: String,

    /// Write the graphing-applet script here instead of printing it
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write the applet embed configuration (JSON) to this file
    #[arg(long)]
    applet: Option<PathBuf>,
}

impl GraphArgs {
    fn form(&self) -> Form {
        Form::new()
            .with_field("expression", self.expression.as_str())
            .with_field("x_lower", self.x_lower.as_str())
            .with_field("x_upper", self.x_upper.as_str())
            .with_field("y_lower", self.y_lower.as_str())
            .with_field("y_upper", self.y_upper.as_str())
    }
}

impl RunArgs {
    fn form(&self) -> Form {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form.set_field(name, value);
        }
        for (name, rows) in &self.grids {
            form.set_grid(name, parse_grid(rows));
        }
        form
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `name=value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{raw}`"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

type CliPage = Page<TerminalSurface<std::io::Stdout>, ScriptRecorder>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Methods => {
            list_methods();
            ExitCode::SUCCESS
        }
        Commands::ExportSvg { input, output } => export(&input, &output),
        Commands::Graph(args) => graph(&args),
        Commands::Run(args) => {
            let config = match ClientConfig::load(cli.config.as_deref()) {
                Ok(config) => config,
                Err(error) => {
                    tracing::error!(%error, "invalid configuration");
                    return ExitCode::FAILURE;
                }
            };
            let mut page = Page::new(
                ApiClient::new(&config),
                TerminalSurface::stdout(),
                ScriptRecorder::new(),
            );
            page.load().await;
            run(&mut page, &args).await
        }
    }
}

fn list_methods() {
    for kind in MethodKind::ALL {
        println!("{:<30} {:<15} {}", kind.slug(), kind.family(), kind.name());
    }
}

fn export(input: &Path, output: &Path) -> ExitCode {
    let content = match fs::read_to_string(input) {
        Ok(content) => content,
        Err(error) => {
            tracing::error!(path = %input.display(), %error, "failed to read export");
            return ExitCode::FAILURE;
        }
    };
    match numera_plot::save_svg(&content, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "export refused");
            ExitCode::FAILURE
        }
    }
}

fn graph(args: &GraphArgs) -> ExitCode {
    let mut page = Page::new(
        ApiClient::new(&ClientConfig::default()),
        TerminalSurface::stdout(),
        ScriptRecorder::new(),
    );
    let Ok(plot) = page.plot_function(&args.form()) else {
        return ExitCode::FAILURE;
    };

    let script = plot.script();
    let mut code = match &args.script {
        Some(path) => write_script(&PlotUpdate::Draw(script), path),
        None => {
            print!("{script}");
            ExitCode::SUCCESS
        }
    };
    if let Some(path) = &args.applet {
        if !write_applet(&AppletConfig::graphing(), path) {
            code = ExitCode::FAILURE;
        }
    }
    code
}

async fn run(page: &mut CliPage, args: &RunArgs) -> ExitCode {
    let form = args.form();
    match args.method {
        MethodKind::Bisection => submit::<root::Bisection>(page, &form, args).await,
        MethodKind::FalseRule => submit::<root::FalseRule>(page, &form, args).await,
        MethodKind::FixedPoint => submit::<root::FixedPoint>(page, &form, args).await,
        MethodKind::NewtonRaphson => submit::<root::NewtonRaphson>(page, &form, args).await,
        MethodKind::Secant => submit::<root::Secant>(page, &form, args).await,
        MethodKind::FirstModifiedNewton => {
            submit::<root::FirstModifiedNewton>(page, &form, args).await
        }
        MethodKind::SecondModifiedNewton => {
            submit::<root::SecondModifiedNewton>(page, &form, args).await
        }
        MethodKind::GaussElimination => {
            submit::<linear::GaussElimination>(page, &form, args).await
        }
        MethodKind::LuFactorization => submit::<linear::LuFactorization>(page, &form, args).await,
        MethodKind::Jacobi => submit::<linear::Jacobi>(page, &form, args).await,
        MethodKind::GaussSeidel => submit::<linear::GaussSeidel>(page, &form, args).await,
        MethodKind::Sor => submit::<linear::Sor>(page, &form, args).await,
        MethodKind::Lagrange => submit::<interpolation::Lagrange>(page, &form, args).await,
        MethodKind::Newton => submit::<interpolation::Newton>(page, &form, args).await,
        MethodKind::Vandermonde => submit::<interpolation::Vandermonde>(page, &form, args).await,
        MethodKind::Spline => submit::<interpolation::Spline>(page, &form, args).await,
    }
}

async fn submit<M: PageMethod>(page: &mut CliPage, form: &Form, args: &RunArgs) -> ExitCode {
    let Ok(submission) = page.submit::<M>(form).await else {
        return ExitCode::FAILURE;
    };

    let mut code = ExitCode::SUCCESS;
    if let Some(path) = &args.script {
        code = write_script(&submission.plot, path);
    }
    if let Some(path) = &args.applet {
        if !write_applet(&AppletConfig::for_family(M::FAMILY), path) {
            code = ExitCode::FAILURE;
        }
    }

    if args.show {
        show(M::NAME, submission);
    }

    code
}

/// Returns whether the configuration was written.
fn write_applet(config: &AppletConfig, path: &Path) -> bool {
    let written = serde_json::to_string_pretty(config)
        .map_err(|error| error.to_string())
        .and_then(|json| fs::write(path, json).map_err(|error| error.to_string()));
    if let Err(error) = &written {
        tracing::error!(path = %path.display(), %error, "failed to write applet config");
    }
    written.is_ok()
}

fn write_script(plot: &PlotUpdate, path: &Path) -> ExitCode {
    match plot {
        PlotUpdate::Draw(script) => match fs::write(path, script.to_string()) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "wrote applet script");
                ExitCode::SUCCESS
            }
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "failed to write applet script");
                ExitCode::FAILURE
            }
        },
        PlotUpdate::Hide => {
            tracing::info!("result has no graph; script not written");
            ExitCode::SUCCESS
        }
    }
}

#[cfg(feature = "native")]
fn show(title: &str, submission: Submission) {
    use numera_plot::ShowConfig;

    match submission.traces {
        Some(traces) if !traces.is_empty() => {
            let config = ShowConfig::new().title(title).legend().log_y();
            if let Err(error) = traces.show(config) {
                tracing::error!(%error, "failed to open viewer");
            }
        }
        _ => tracing::info!("result has no convergence traces"),
    }
}

#[cfg(not(feature = "native"))]
fn show(_title: &str, _submission: Submission) {
    tracing::warn!("the convergence viewer needs the `native` feature");
}
