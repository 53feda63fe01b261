//! Native window for convergence traces.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::trace::{Trace, Traces};

/// Window options for [`Traces::show`].
///
/// # Example
///
/// ```ignore
/// traces.show(ShowConfig::new().title("Jacobi").legend().log_y())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShowConfig {
    title: Option<String>,
    legend: bool,
    log_y: bool,
}

impl ShowConfig {
    /// An untitled window with a linear y axis and no legend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn legend(mut self) -> Self {
        self.legend = true;
        self
    }

    /// Plots `log₁₀(y)`; non-positive values are skipped.
    #[must_use]
    pub fn log_y(mut self) -> Self {
        self.log_y = true;
        self
    }
}

impl Traces {
    /// Opens a blocking window displaying every trace.
    ///
    /// # Errors
    ///
    /// Returns an error if the native window cannot be created.
    pub fn show(self, config: ShowConfig) -> Result<(), eframe::Error> {
        let title = config.title.unwrap_or_default();
        let traces = self.traces().to_vec();

        eframe::run_native(
            &title,
            eframe::NativeOptions::default(),
            Box::new(move |_cc| {
                Ok(Box::new(TraceApp {
                    traces,
                    legend: config.legend,
                    log_y: config.log_y,
                }))
            }),
        )
    }
}

struct TraceApp {
    traces: Vec<Trace>,
    legend: bool,
    log_y: bool,
}

impl eframe::App for TraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut plot = Plot::new("numera_traces").x_axis_label("iteration");
            if self.legend {
                plot = plot.legend(Legend::default());
            }
            if self.log_y {
                plot = plot.y_axis_label("log₁₀");
            }
            plot.show(ui, |plot_ui| {
                for trace in &self.traces {
                    let line = Line::new(plot_points(trace, self.log_y)).name(&trace.name);
                    plot_ui.line(line);
                }
            });
        });
    }
}

fn plot_points(trace: &Trace, log_y: bool) -> PlotPoints {
    if !log_y {
        return trace.points.iter().copied().collect();
    }
    trace
        .points
        .iter()
        .filter_map(|&[iteration, value]| (value > 0.0).then(|| [iteration, value.log10()]))
        .collect()
}
