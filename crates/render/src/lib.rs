//! Rendering of method results.
//!
//! A response body is decoded into the method's response type and turned
//! into a [`Rendered`] result: an optional [`Table`], LaTeX fragments, and
//! plain messages. A [`Surface`] displays results and errors.

mod interpolation;
pub mod latex;
mod linear;
mod root;
mod surface;
mod table;

use numera_core::{Method, cell_text};
use serde_json::Value;
use thiserror::Error;

pub use surface::{MemorySurface, Surface, TerminalSurface};
pub use table::Table;

/// A result ready to be displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub title: String,
    pub table: Option<Table>,
    pub latex: Vec<String>,
    pub messages: Vec<String>,
}

impl Rendered {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    #[must_use]
    pub fn with_latex(mut self, fragment: impl Into<String>) -> Self {
        self.latex.push(fragment.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unexpected response structure: {reason}")]
    UnexpectedStructure { reason: String },
}

impl RenderError {
    pub(crate) fn structure(reason: impl Into<String>) -> Self {
        Self::UnexpectedStructure {
            reason: reason.into(),
        }
    }
}

/// A method whose response can be rendered.
pub trait RenderMethod: Method {
    /// Renders a decoded response.
    ///
    /// `follow_up` is the body returned by the method's follow-up endpoint,
    /// when it has one.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnexpectedStructure`] if the response is
    /// internally inconsistent.
    fn render(response: &Self::Response, follow_up: Option<&Value>)
    -> Result<Rendered, RenderError>;
}

/// Decodes a response body into the method's response type.
///
/// # Errors
///
/// Returns [`RenderError::UnexpectedStructure`] if expected fields are
/// missing or have the wrong shape.
pub fn decode<M: Method>(body: Value) -> Result<M::Response, RenderError> {
    serde_json::from_value(body).map_err(|error| RenderError::structure(error.to_string()))
}

/// Decodes and renders a response body, titled with the method name.
///
/// # Errors
///
/// Returns [`RenderError::UnexpectedStructure`] if the body cannot be
/// decoded or rendered.
pub fn render<M: RenderMethod>(
    body: Value,
    follow_up: Option<&Value>,
) -> Result<Rendered, RenderError> {
    let response = decode::<M>(body)?;
    render_response::<M>(&response, follow_up)
}

/// Renders an already decoded response, titled with the method name.
///
/// # Errors
///
/// Returns [`RenderError::UnexpectedStructure`] if the response is
/// internally inconsistent.
pub fn render_response<M: RenderMethod>(
    response: &M::Response,
    follow_up: Option<&Value>,
) -> Result<Rendered, RenderError> {
    let mut rendered = M::render(response, follow_up)?;
    rendered.title = M::NAME.to_owned();
    Ok(rendered)
}

/// Cell text for every value.
pub(crate) fn texts(values: &[Value]) -> Vec<String> {
    values.iter().map(cell_text).collect()
}

/// Cell text for every row.
pub(crate) fn text_rows(rows: &[Vec<Value>]) -> Vec<Vec<String>> {
    rows.iter().map(|row| texts(row)).collect()
}
