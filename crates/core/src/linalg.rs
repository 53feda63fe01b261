use serde::{Deserialize, Serialize};

/// A square, row-major coefficient matrix.
///
/// Serializes as a sequence of rows, e.g. `[[1.0, 0.0], [0.0, 1.0]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix(Vec<Vec<f64>>);

impl Matrix {
    /// Creates a matrix from its rows.
    ///
    /// Returns `None` if the rows are empty or the matrix is not square.
    #[must_use]
    pub fn new(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self(rows))
    }

    /// Returns the number of rows (and columns).
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }

    /// Returns the entry at `(row, col)`, if in bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.0.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// A column vector.
///
/// The service expects column vectors as a sequence of single-element
/// sequences, so `[1, 2]` serializes as `[[1.0], [2.0]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnVector(Vec<[f64; 1]>);

impl ColumnVector {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self(values.into_iter().map(|value| [value]).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).map(|[value]| *value)
    }

    /// Iterates over the vector's entries.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|[value]| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn rejects_ragged_and_empty_rows() {
        assert!(Matrix::new(vec![]).is_none());
        assert!(Matrix::new(vec![vec![1.0, 2.0], vec![3.0]]).is_none());
        assert!(Matrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).is_none());
    }

    #[test]
    fn matrix_serializes_row_major() {
        let matrix = Matrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.get(0, 1), Some(0.0));
        assert_eq!(matrix.get(2, 0), None);
        assert_eq!(serde_json::to_value(&matrix).unwrap(), json!([[1.0, 0.0], [0.0, 1.0]]));
    }

    #[test]
    fn column_vector_nests_each_entry() {
        let vector = ColumnVector::new([1.0, -2.5]);
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.get(1), Some(-2.5));
        assert_eq!(vector.values().collect::<Vec<_>>(), [1.0, -2.5]);
        assert_eq!(serde_json::to_value(&vector).unwrap(), json!([[1.0], [-2.5]]));
    }
}
