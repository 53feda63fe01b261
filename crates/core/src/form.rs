use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    linalg::{ColumnVector, Matrix},
    symbolic::SymbolicError,
};

/// Smallest accepted coefficient matrix size.
pub const MIN_SIZE: usize = 2;

/// Largest accepted coefficient matrix size.
pub const MAX_SIZE: usize = 6;

/// Fewest sample points accepted by the interpolation methods.
pub const MIN_POINTS: usize = 2;

/// Most sample points accepted by the interpolation methods.
pub const MAX_POINTS: usize = 6;

/// Raw cell text, one inner vector per row.
pub type Grid = Vec<Vec<String>>;

/// Errors raised while turning raw form input into a request payload.
///
/// Any of these blocks the submission before a request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("field `{field}` is required")]
    Missing { field: String },

    #[error("field `{field}` must be a number, got `{value}`")]
    NotANumber { field: String, value: String },

    #[error("field `{field}` must be a non-negative integer, got `{value}`")]
    NotAnInteger { field: String, value: String },

    #[error("field `{field}` must be one of {expected}, got `{value}`")]
    InvalidChoice {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("cell ({row}, {col}) of `{field}` must be a number, got `{value}`")]
    InvalidCell {
        field: String,
        row: usize,
        col: usize,
        value: String,
    },

    #[error("`{field}` must be a square matrix between {min}x{min} and {max}x{max}", min = MIN_SIZE, max = MAX_SIZE)]
    NotSquare { field: String },

    #[error("`{field}` must have {expected} entries, got {actual}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("`{field}` must have between {min} and {max} entries, got {actual}", min = MIN_POINTS, max = MAX_POINTS)]
    PointCount { field: String, actual: usize },

    #[error("`{field}` was left blank and could not be derived from the expression: {source}")]
    Underivable {
        field: String,
        #[source]
        source: SymbolicError,
    },

    #[error("`{lower}` must be less than `{upper}`")]
    EmptyRange { lower: String, upper: String },
}

/// An enumerated form field.
pub trait Choice: Sized {
    /// Human-readable list of accepted values, used in error messages.
    const EXPECTED: &'static str;

    /// Parses a trimmed, non-empty raw value.
    fn parse(raw: &str) -> Option<Self>;
}

/// Raw form input: named scalar fields and named cell grids.
///
/// Values are kept as typed-in text; the typed accessors parse them on
/// demand and report which field was at fault.
///
/// # Example
///
/// ```
/// use numera_core::Form;
///
/// let form = Form::new()
///     .with_field("tolerance", "1e-7")
///     .with_grid("A", "1, 0; 0, 1");
///
/// assert_eq!(form.number("tolerance"), Ok(1e-7));
/// assert_eq!(form.matrix("A").unwrap().size(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    fields: BTreeMap<String, String>,
    grids: BTreeMap<String, Grid>,
}

impl Form {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar field, replacing any previous value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Adds a cell grid written as `;`-separated rows of `,`-separated cells.
    #[must_use]
    pub fn with_grid(mut self, name: impl Into<String>, text: &str) -> Self {
        self.set_grid(name, parse_grid(text));
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn set_grid(&mut self, name: impl Into<String>, grid: Grid) {
        self.grids.insert(name.into(), grid);
    }

    /// Returns the trimmed value of a field, or `None` if it is absent or blank.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn grid(&self, name: &str) -> Option<&Grid> {
        self.grids.get(name)
    }

    /// Reads a required text field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Missing`] if the field is absent or blank.
    pub fn text(&self, name: &str) -> Result<String, FormError> {
        self.field(name).map(str::to_owned).ok_or_else(|| missing(name))
    }

    /// Reads a required finite number.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is blank or does not parse to a finite number.
    pub fn number(&self, name: &str) -> Result<f64, FormError> {
        let raw = self.field(name).ok_or_else(|| missing(name))?;
        parse_number(raw).ok_or_else(|| FormError::NotANumber {
            field: name.to_owned(),
            value: raw.to_owned(),
        })
    }

    /// Reads a number, falling back to `default` when the field is blank.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank value does not parse to a finite number.
    pub fn number_or(&self, name: &str, default: f64) -> Result<f64, FormError> {
        match self.field(name) {
            Some(_) => self.number(name),
            None => Ok(default),
        }
    }

    /// Reads a required non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is blank or not a non-negative integer.
    pub fn integer(&self, name: &str) -> Result<u32, FormError> {
        let raw = self.field(name).ok_or_else(|| missing(name))?;
        raw.parse().map_err(|_| FormError::NotAnInteger {
            field: name.to_owned(),
            value: raw.to_owned(),
        })
    }

    /// Reads an integer, falling back to `default` when the field is blank.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank value is not a non-negative integer.
    pub fn integer_or(&self, name: &str, default: u32) -> Result<u32, FormError> {
        match self.field(name) {
            Some(_) => self.integer(name),
            None => Ok(default),
        }
    }

    /// Reads an optional integer; blank input yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank value is not a non-negative integer.
    pub fn optional_integer(&self, name: &str) -> Result<Option<u32>, FormError> {
        self.field(name).map(|_| self.integer(name)).transpose()
    }

    /// Reads a required enumerated field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is blank or not one of the accepted values.
    pub fn choice<T: Choice>(&self, name: &str) -> Result<T, FormError> {
        let raw = self.field(name).ok_or_else(|| missing(name))?;
        T::parse(raw).ok_or_else(|| FormError::InvalidChoice {
            field: name.to_owned(),
            value: raw.to_owned(),
            expected: T::EXPECTED,
        })
    }

    /// Reads a square coefficient matrix from a grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is missing, not square, outside the
    /// supported size range, or has a cell that is not a finite number.
    pub fn matrix(&self, name: &str) -> Result<Matrix, FormError> {
        let grid = self.grid(name).ok_or_else(|| missing(name))?;

        let mut rows = Vec::with_capacity(grid.len());
        for (r, row) in grid.iter().enumerate() {
            let mut values = Vec::with_capacity(row.len());
            for (c, cell) in row.iter().enumerate() {
                values.push(parse_cell(name, r, c, cell)?);
            }
            rows.push(values);
        }

        if !(MIN_SIZE..=MAX_SIZE).contains(&rows.len()) {
            return Err(FormError::NotSquare {
                field: name.to_owned(),
            });
        }

        Matrix::new(rows).ok_or_else(|| FormError::NotSquare {
            field: name.to_owned(),
        })
    }

    /// Reads a column vector of exactly `len` entries.
    ///
    /// Cells are taken in row order, so both `"1; 2"` and `"1, 2"` read as
    /// the vector `[1, 2]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is missing, has a non-numeric cell, or
    /// does not have `len` entries.
    pub fn column(&self, name: &str, len: usize) -> Result<ColumnVector, FormError> {
        let values = self.values(name)?;
        if values.len() != len {
            return Err(FormError::LengthMismatch {
                field: name.to_owned(),
                expected: len,
                actual: values.len(),
            });
        }
        Ok(ColumnVector::new(values))
    }

    /// Reads paired sample points from two grids.
    ///
    /// # Errors
    ///
    /// Returns an error if either list is missing or non-numeric, holds
    /// fewer than [`MIN_POINTS`] or more than [`MAX_POINTS`] values, or the
    /// two lists differ in length.
    pub fn points(&self, x_name: &str, y_name: &str) -> Result<(Vec<f64>, Vec<f64>), FormError> {
        let x = self.values(x_name)?;
        if !(MIN_POINTS..=MAX_POINTS).contains(&x.len()) {
            return Err(FormError::PointCount {
                field: x_name.to_owned(),
                actual: x.len(),
            });
        }

        let y = self.values(y_name)?;
        if y.len() != x.len() {
            return Err(FormError::LengthMismatch {
                field: y_name.to_owned(),
                expected: x.len(),
                actual: y.len(),
            });
        }

        Ok((x, y))
    }

    /// Flattens a grid in row order, parsing every cell.
    fn values(&self, name: &str) -> Result<Vec<f64>, FormError> {
        let grid = self.grid(name).ok_or_else(|| missing(name))?;
        grid.iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, cell)| (r, c, cell)))
            .map(|(r, c, cell)| parse_cell(name, r, c, cell))
            .collect()
    }
}

/// Splits grid text into rows (`;`) and cells (`,`), trimming each cell.
///
/// Blank rows are dropped; blank cells are kept so they fail validation.
#[must_use]
pub fn parse_grid(text: &str) -> Grid {
    text.split(';')
        .filter(|row| !row.trim().is_empty())
        .map(|row| row.split(',').map(|cell| cell.trim().to_owned()).collect())
        .collect()
}

fn missing(name: &str) -> FormError {
    FormError::Missing {
        field: name.to_owned(),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses one grid cell; reported positions are 1-based.
fn parse_cell(name: &str, row: usize, col: usize, cell: &str) -> Result<f64, FormError> {
    parse_number(cell.trim()).ok_or_else(|| FormError::InvalidCell {
        field: name.to_owned(),
        row: row + 1,
        col: col + 1,
        value: cell.to_owned(),
    })
}
