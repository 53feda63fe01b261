//! Graph updates for Numera results.
//!
//! Results are drawn by scripting an embedded graphing applet through the
//! [`GraphingWidget`] trait. Each method maps its request and response to a
//! [`PlotUpdate`] via [`PlotMethod`]: a [`PlotScript`] to replay, or an
//! instruction to hide the graph. A standalone [`FunctionPlot`] draws any
//! user function within chosen axis bounds.
//!
//! Iteration histories can also be collected into [`Traces`] and, with the
//! `native` feature, shown in a desktop window.

mod applet;
mod graph;
mod methods;
mod script;
mod svg;
mod trace;
#[cfg(feature = "native")]
mod viewer;
mod widget;

pub use applet::AppletConfig;
pub use graph::{DEFAULT_FUNCTION, FunctionPlot};
pub use methods::PlotMethod;
pub use script::{PlotScript, PlotUpdate};
pub use svg::{DEFAULT_SVG_NAME, SvgError, export_svg, save_svg, validate_svg};
pub use trace::{Trace, Traces};
#[cfg(feature = "native")]
pub use viewer::ShowConfig;
pub use widget::{GraphingWidget, ScriptRecorder, WidgetCall};
