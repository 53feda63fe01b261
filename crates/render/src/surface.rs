use std::{
    fmt::Write as _,
    io::{self, Write},
};

use crate::Rendered;

/// Where results and errors are displayed.
///
/// Every failure kind reaches the user through [`Surface::show_error`].
pub trait Surface {
    /// Removes previously displayed content.
    fn clear(&mut self);

    fn show(&mut self, rendered: &Rendered);

    fn show_error(&mut self, message: &str);
}

/// Writes results as plain text.
#[derive(Debug)]
pub struct TerminalSurface<W> {
    out: W,
}

impl TerminalSurface<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(error) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::warn!(%error, "failed to write output");
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn clear(&mut self) {}

    fn show(&mut self, rendered: &Rendered) {
        let mut text = String::new();
        if !rendered.title.is_empty() {
            let _ = writeln!(text, "{}\n", rendered.title);
        }
        if let Some(table) = &rendered.table {
            let _ = writeln!(text, "{table}");
        }
        for fragment in &rendered.latex {
            let _ = writeln!(text, "{fragment}");
        }
        if !rendered.latex.is_empty() {
            text.push('\n');
        }
        for message in &rendered.messages {
            let _ = writeln!(text, "{message}");
        }
        self.emit(&text);
    }

    fn show_error(&mut self, message: &str) {
        self.emit(&format!("error: {message}\n"));
    }
}

/// Keeps the last displayed content in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    pub shown: Option<Rendered>,
    pub error: Option<String>,
    pub clears: usize,
}

impl Surface for MemorySurface {
    fn clear(&mut self) {
        self.shown = None;
        self.error = None;
        self.clears += 1;
    }

    fn show(&mut self, rendered: &Rendered) {
        self.shown = Some(rendered.clone());
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Table;

    #[test]
    fn terminal_prints_sections_in_order() {
        let mut table = Table::new(["Iteration", "Xn"]);
        table.push_row(vec!["1".to_owned(), "14.0".to_owned()]);
        let rendered = Rendered::new("Bisection")
            .with_table(table)
            .with_latex(r"x = \begin{pmatrix} 1 \end{pmatrix}")
            .with_message("done");

        let mut surface = TerminalSurface::new(Vec::new());
        surface.show(&rendered);
        surface.show_error("Y");

        let text = String::from_utf8(surface.into_inner()).unwrap();
        let title = text.find("Bisection").unwrap();
        let row = text.find("1         | 14.0").unwrap();
        let latex = text.find("pmatrix").unwrap();
        let message = text.find("done").unwrap();
        assert!(title < row && row < latex && latex < message);
        assert!(text.ends_with("error: Y\n"));
    }

    #[test]
    fn memory_clear_drops_previous_output() {
        let mut surface = MemorySurface::default();
        surface.show(&Rendered::new("old"));
        surface.show_error("bad");
        surface.clear();
        assert_eq!(surface.shown, None);
        assert_eq!(surface.error, None);
        assert_eq!(surface.clears, 1);
    }
}
