use std::fmt;

use crate::widget::{GraphingWidget, WidgetCall};

/// An ordered list of widget calls.
///
/// Built with chained methods and replayed on a widget with
/// [`PlotScript::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotScript {
    calls: Vec<WidgetCall>,
}

impl PlotScript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reset(mut self) -> Self {
        self.calls.push(WidgetCall::Reset);
        self
    }

    #[must_use]
    pub fn eval(mut self, command: impl Into<String>) -> Self {
        self.calls.push(WidgetCall::Eval(command.into()));
        self
    }

    #[must_use]
    pub fn coord_system(mut self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        self.calls.push(WidgetCall::CoordSystem {
            x_min,
            x_max,
            y_min,
            y_max,
        });
        self
    }

    #[must_use]
    pub fn set_visible(mut self, name: impl Into<String>, visible: bool) -> Self {
        self.calls.push(WidgetCall::SetVisible {
            name: name.into(),
            visible,
        });
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[WidgetCall] {
        &self.calls
    }

    pub fn apply<W: GraphingWidget + ?Sized>(&self, widget: &mut W) {
        for call in &self.calls {
            call.apply(widget);
        }
    }
}

impl fmt::Display for PlotScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for call in &self.calls {
            writeln!(f, "{call}")?;
        }
        Ok(())
    }
}

/// What a result does to the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotUpdate {
    /// Run the script and keep the graph visible.
    Draw(PlotScript),
    /// The result has no useful picture; hide the graph.
    Hide,
}

impl PlotUpdate {
    #[must_use]
    pub fn script(&self) -> Option<&PlotScript> {
        match self {
            Self::Draw(script) => Some(script),
            Self::Hide => None,
        }
    }
}
