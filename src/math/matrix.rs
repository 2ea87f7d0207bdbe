use serde::{Serialize, Deserialize};

use crate::error::{Result, TractError};

/// Dense row-major matrix. Batches are stored one sample per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixData")]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

/// Serialized form of `Matrix`; checked against its header on load.
#[derive(Deserialize)]
struct MatrixData {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl TryFrom<MatrixData> for Matrix {
    type Error = TractError;

    fn try_from(raw: MatrixData) -> Result<Matrix> {
        let declared = [raw.rows, raw.cols];
        let m = Matrix::from_rows(raw.data)?;
        // An empty matrix has no row to carry its width.
        let cols = if m.rows == 0 { raw.cols } else { m.cols };
        if [m.rows, cols] != declared {
            return Err(TractError::shape("Matrix header", &declared, &m.shape()));
        }
        Ok(Matrix { cols, ..m })
    }
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from rows, rejecting ragged input.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, |row| row.len());
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(TractError::shape("Matrix::from_rows", &[cols], &[bad.len()]));
        }
        Ok(Matrix { rows: data.len(), cols, data })
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(TractError::shape("Matrix::dot", &[self.cols], &[rhs.rows]));
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        Ok(res)
    }

    /// Adds a `(1, cols)` row vector to every row.
    pub fn add_row(&self, row: &Matrix) -> Result<Matrix> {
        if row.rows != 1 || row.cols != self.cols {
            return Err(TractError::shape("Matrix::add_row", &[1, self.cols], &row.shape()));
        }

        let bias = &row.data[0];
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|r| r.iter().zip(bias).map(|(x, b)| x + b).collect())
                .collect(),
        })
    }

    /// Returns a copy with `value` appended as an extra last column.
    pub fn with_column(&self, value: f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols + 1,
            data: self.data
                .iter()
                .map(|r| {
                    let mut r = r.clone();
                    r.push(value);
                    r
                })
                .collect(),
        }
    }

    /// Euclidean norm of every row.
    pub fn row_norms(&self) -> Vec<f64> {
        self.data
            .iter()
            .map(|r| r.iter().map(|x| x * x).sum::<f64>().sqrt())
            .collect()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
