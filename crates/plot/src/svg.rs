use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::widget::GraphingWidget;

/// File name used when the caller does not choose one.
pub const DEFAULT_SVG_NAME: &str = "geogebra_graph.svg";

#[derive(Debug, Error)]
pub enum SvgError {
    #[error("the graph could not be exported")]
    Unavailable,

    #[error("exported content is not a valid SVG document")]
    NotSvg,

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Accepts content only if it begins with the `<svg` root tag.
///
/// # Errors
///
/// Returns [`SvgError::NotSvg`] for anything else, empty content included.
pub fn validate_svg(content: &str) -> Result<&str, SvgError> {
    if content.starts_with("<svg") {
        Ok(content)
    } else {
        Err(SvgError::NotSvg)
    }
}

/// Validates the content and writes it to `path`.
///
/// Nothing is written when validation fails.
///
/// # Errors
///
/// Returns an error if the content is not SVG or the file cannot be written.
pub fn save_svg(content: &str, path: &Path) -> Result<(), SvgError> {
    let content = validate_svg(content)?;
    fs::write(path, content).map_err(|source| SvgError::Write {
        path: path.to_owned(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = content.len(), "saved graph");
    Ok(())
}

/// Exports the widget's drawing and saves it to `path`.
///
/// # Errors
///
/// Returns an error if the widget cannot export, the export is not SVG, or
/// the file cannot be written.
pub fn export_svg<W: GraphingWidget + ?Sized>(widget: &mut W, path: &Path) -> Result<(), SvgError> {
    let content = widget.export_svg().ok_or(SvgError::Unavailable)?;
    save_svg(&content, path)
}
