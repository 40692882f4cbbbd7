use serde::{Deserialize, Serialize};

/// Read-only user×item interaction strengths in compressed sparse row form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCsr", into = "RawCsr")]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawCsr {
    shape: (usize, usize),
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<f32>,
}

impl CsrMatrix {
    pub fn new(
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<u32>,
        data: Vec<f32>,
    ) -> Result<Self, String> {
        let (rows, cols) = shape;
        if indptr.len() != rows + 1 {
            return Err(format!("indptr has {} entries, expected {}", indptr.len(), rows + 1));
        }
        if indptr.first().copied() != Some(0) {
            return Err("indptr must start at 0".to_string());
        }
        if indptr.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err("indptr must be non-decreasing".to_string());
        }
        if indices.len() != data.len() {
            return Err(format!(
                "indices ({}) and data ({}) lengths differ",
                indices.len(),
                data.len()
            ));
        }
        if indptr.last().copied() != Some(indices.len()) {
            return Err(format!("indptr must end at nnz ({})", indices.len()));
        }
        if let Some(column) = indices.iter().find(|column| **column as usize >= cols) {
            return Err(format!("column index {column} is outside {cols} columns"));
        }

        Ok(Self { rows, cols, indptr, indices, data })
    }

    /// Builds a matrix from `(row, col, value)` triples; duplicate cells are summed.
    pub fn from_triplets(
        shape: (usize, usize),
        triplets: &[(usize, u32, f32)],
    ) -> Result<Self, String> {
        let mut by_row: Vec<Vec<(u32, f32)>> = vec![Vec::new(); shape.0];
        for &(row, col, value) in triplets {
            let cells = by_row
                .get_mut(row)
                .ok_or_else(|| format!("row index {row} is outside {} rows", shape.0))?;
            match cells.iter_mut().find(|(existing, _)| *existing == col) {
                Some((_, total)) => *total += value,
                None => cells.push((col, value)),
            }
        }

        let mut indptr = Vec::with_capacity(shape.0 + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for mut cells in by_row {
            cells.sort_by_key(|(col, _)| *col);
            for (col, value) in cells {
                indices.push(col);
                data.push(value);
            }
            indptr.push(indices.len());
        }

        Self::new(shape, indptr, indices, data)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Stored `(column, value)` pairs of one row, or `None` past the last row.
    pub fn row(&self, row: usize) -> Option<impl Iterator<Item = (u32, f32)> + '_> {
        if row >= self.rows {
            return None;
        }
        let span = self.indptr[row]..self.indptr[row + 1];
        Some(
            self.indices[span.clone()]
                .iter()
                .copied()
                .zip(self.data[span].iter().copied()),
        )
    }
}

impl TryFrom<RawCsr> for CsrMatrix {
    type Error = String;

    fn try_from(value: RawCsr) -> Result<Self, Self::Error> {
        Self::new(value.shape, value.indptr, value.indices, value.data)
    }
}

impl From<CsrMatrix> for RawCsr {
    fn from(value: CsrMatrix) -> Self {
        Self {
            shape: (value.rows, value.cols),
            indptr: value.indptr,
            indices: value.indices,
            data: value.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CsrMatrix;

    #[test]
    fn rows_yield_stored_cells_in_column_order() {
        let matrix =
            CsrMatrix::from_triplets((2, 4), &[(0, 3, 1.0), (0, 1, 2.0), (1, 0, 5.0), (0, 1, 1.0)])
                .expect("valid triplets");

        let first: Vec<_> = matrix.row(0).expect("row 0").collect();
        assert_eq!(first, vec![(1, 3.0), (3, 1.0)]);
        assert_eq!(matrix.nnz(), 3);
        assert!(matrix.row(2).is_none());
    }

    #[test]
    fn structural_faults_are_rejected() {
        assert!(CsrMatrix::new((2, 2), vec![0, 1], vec![0], vec![1.0]).is_err());
        assert!(CsrMatrix::new((1, 2), vec![0, 1], vec![5], vec![1.0]).is_err());
        assert!(CsrMatrix::new((2, 2), vec![0, 2, 1], vec![0, 1], vec![1.0, 1.0]).is_err());
        assert!(CsrMatrix::new((1, 2), vec![0, 1], vec![0], vec![]).is_err());
    }

    #[test]
    fn deserializes_scipy_style_layout() {
        let matrix: CsrMatrix = serde_json::from_str(
            r#"{"shape": [2, 3], "indptr": [0, 1, 1], "indices": [2], "data": [4.0]}"#,
        )
        .expect("valid csr json");

        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 3);
        assert_eq!(matrix.row(1).expect("row 1").count(), 0);
    }
}
