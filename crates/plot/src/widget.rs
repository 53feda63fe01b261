use std::fmt;

/// The scripting surface of an embedded graphing applet.
pub trait GraphingWidget {
    /// Evaluates one applet command, such as `f(x) = x^2`.
    fn eval_command(&mut self, command: &str);

    /// Clears every object from the construction.
    fn reset(&mut self);

    fn set_coord_system(&mut self, x_min: f64, x_max: f64, y_min: f64, y_max: f64);

    /// Shows or hides a view or object by name.
    fn set_visible(&mut self, name: &str, visible: bool);

    /// Returns the current drawing as SVG text, if the applet can export it.
    fn export_svg(&mut self) -> Option<String>;
}

/// One call on a [`GraphingWidget`].
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCall {
    Reset,
    Eval(String),
    CoordSystem {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
    SetVisible {
        name: String,
        visible: bool,
    },
}

impl WidgetCall {
    /// Performs the call on a widget.
    pub fn apply<W: GraphingWidget + ?Sized>(&self, widget: &mut W) {
        match self {
            Self::Reset => widget.reset(),
            Self::Eval(command) => widget.eval_command(command),
            Self::CoordSystem {
                x_min,
                x_max,
                y_min,
                y_max,
            } => widget.set_coord_system(*x_min, *x_max, *y_min, *y_max),
            Self::SetVisible { name, visible } => widget.set_visible(name, *visible),
        }
    }
}

/// Writes the call as a statement against the browser applet API.
impl fmt::Display for WidgetCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "ggbApplet.reset();"),
            Self::Eval(command) => write!(f, "ggbApplet.evalCommand({});", quoted(command)),
            Self::CoordSystem {
                x_min,
                x_max,
                y_min,
                y_max,
            } => write!(f, "ggbApplet.setCoordSystem({x_min}, {x_max}, {y_min}, {y_max});"),
            Self::SetVisible { name, visible } => {
                write!(f, "ggbApplet.setVisible({}, {visible});", quoted(name))
            }
        }
    }
}

fn quoted(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

/// A [`GraphingWidget`] that records every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptRecorder {
    calls: Vec<WidgetCall>,
    svg: Option<String>,
}

impl ScriptRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content returned by [`GraphingWidget::export_svg`].
    #[must_use]
    pub fn with_svg(mut self, content: impl Into<String>) -> Self {
        self.svg = Some(content.into());
        self
    }

    #[must_use]
    pub fn calls(&self) -> &[WidgetCall] {
        &self.calls
    }

    /// The commands passed to [`GraphingWidget::eval_command`], in order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|call| match call {
            WidgetCall::Eval(command) => Some(command.as_str()),
            _ => None,
        })
    }
}

impl GraphingWidget for ScriptRecorder {
    fn eval_command(&mut self, command: &str) {
        self.calls.push(WidgetCall::Eval(command.to_owned()));
    }

    fn reset(&mut self) {
        self.calls.push(WidgetCall::Reset);
    }

    fn set_coord_system(&mut self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
        self.calls.push(WidgetCall::CoordSystem {
            x_min,
            x_max,
            y_min,
            y_max,
        });
    }

    fn set_visible(&mut self, name: &str, visible: bool) {
        self.calls.push(WidgetCall::SetVisible {
            name: name.to_owned(),
            visible,
        });
    }

    fn export_svg(&mut self) -> Option<String> {
        self.svg.clone()
    }
}
