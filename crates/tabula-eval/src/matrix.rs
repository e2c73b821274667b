// Copyright (C) 2026 The Tabula Authors.
// This file is part of the tabula interpreter.

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! Dense row-major matrices (spec §9 "Matrix representation").

use tabula_errors::EvalErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

/// A resolved index-operator selector, after evaluating the AST's
/// [`tabula_ast::Expr::DotsSelect`] / arbitrary-expression selectors into
/// either the full axis or a concrete 0-based position (spec §4.4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Dots,
    Index(usize),
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self { rows, cols, data }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, vec![0.0; rows * cols])
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self::new(rows, cols, vec![value; rows * cols])
    }

    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self::new(n, n, data)
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    fn set(&mut self, r: usize, c: usize, v: f64) {
        self.data[r * self.cols + c] = v;
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn any_nonzero(&self) -> bool {
        self.data.iter().any(|&v| v != 0.0)
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix::new(self.rows, self.cols, self.data.iter().map(|&v| f(v)).collect())
    }

    pub fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Result<Matrix, EvalErrorKind> {
        if self.shape() != other.shape() {
            return Err(EvalErrorKind::MatrixDimensionsMismatch);
        }
        let data = self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect();
        Ok(Matrix::new(self.rows, self.cols, data))
    }

    pub fn matmul(&self, other: &Matrix) -> Result<Matrix, EvalErrorKind> {
        if self.cols != other.rows {
            return Err(EvalErrorKind::MatrixDimensionsMismatch);
        }
        let mut data = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut acc = 0.0;
                for k in 0..self.cols {
                    acc += self.get(i, k) * other.get(k, j);
                }
                data[i * other.cols + j] = acc;
            }
        }
        Ok(Matrix::new(self.rows, other.cols, data))
    }

    /// Transposes the matrix's storage in place, preserving whatever
    /// identity (e.g. `Rc<RefCell<Matrix>>`) the caller holds it by.
    pub fn transpose_in_place(&mut self) {
        let mut data = vec![0.0; self.data.len()];
        for r in 0..self.rows {
            for c in 0..self.cols {
                data[c * self.rows + r] = self.get(r, c);
            }
        }
        self.data = data;
        std::mem::swap(&mut self.rows, &mut self.cols);
    }

    pub fn row(&self, i: usize) -> Result<Matrix, EvalErrorKind> {
        if i >= self.rows {
            return Err(EvalErrorKind::Index);
        }
        Ok(Matrix::new(1, self.cols, self.data[i * self.cols..(i + 1) * self.cols].to_vec()))
    }

    /// A column, row-shaped per spec §4.4.5 (`1×R`, not `R×1`).
    pub fn column(&self, j: usize) -> Result<Matrix, EvalErrorKind> {
        if j >= self.cols {
            return Err(EvalErrorKind::Index);
        }
        Ok(Matrix::new(1, self.rows, (0..self.rows).map(|r| self.get(r, j)).collect()))
    }

    pub fn cell(&self, i: usize, j: usize) -> Result<f64, EvalErrorKind> {
        if i >= self.rows || j >= self.cols {
            return Err(EvalErrorKind::Index);
        }
        Ok(self.get(i, j))
    }

    /// Implements the four `m[s1, s2] = rhs` forms of spec §4.4.5,
    /// broadcasting a NUMBER `rhs` across the whole selected sub-slice and
    /// requiring a MATRIX `rhs` to match the selected shape exactly.
    pub fn assign_index(
        &mut self,
        first: Selector,
        second: Selector,
        number: Option<f64>,
        matrix: Option<&Matrix>,
    ) -> Result<(), EvalErrorKind> {
        match (first, second) {
            (Selector::Dots, Selector::Dots) => {
                if let Some(n) = number {
                    self.data.iter_mut().for_each(|v| *v = n);
                } else if let Some(m) = matrix {
                    if m.shape() != self.shape() {
                        return Err(EvalErrorKind::Index);
                    }
                    self.data.copy_from_slice(&m.data);
                }
            }
            (Selector::Index(i), Selector::Dots) => {
                if i >= self.rows {
                    return Err(EvalErrorKind::Index);
                }
                if let Some(n) = number {
                    for c in 0..self.cols {
                        self.set(i, c, n);
                    }
                } else if let Some(m) = matrix {
                    if m.as_slice().len() != self.cols {
                        return Err(EvalErrorKind::Index);
                    }
                    for (c, &v) in m.as_slice().iter().enumerate() {
                        self.set(i, c, v);
                    }
                }
            }
            (Selector::Dots, Selector::Index(j)) => {
                if j >= self.cols {
                    return Err(EvalErrorKind::Index);
                }
                if let Some(n) = number {
                    for r in 0..self.rows {
                        self.set(r, j, n);
                    }
                } else if let Some(m) = matrix {
                    if m.as_slice().len() != self.rows {
                        return Err(EvalErrorKind::Index);
                    }
                    for (r, &v) in m.as_slice().iter().enumerate() {
                        self.set(r, j, v);
                    }
                }
            }
            (Selector::Index(i), Selector::Index(j)) => {
                if i >= self.rows || j >= self.cols {
                    return Err(EvalErrorKind::Index);
                }
                if let Some(n) = number {
                    self.set(i, j, n);
                } else if let Some(m) = matrix {
                    if m.as_slice().len() != 1 {
                        return Err(EvalErrorKind::Index);
                    }
                    self.set(i, j, m.as_slice()[0]);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_swaps_shape_and_data() {
        let mut m = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        m.transpose_in_place();
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.get(0, 1), 4.0);
        assert_eq!(m.get(2, 0), 3.0);
    }

    #[test]
    fn matmul_checks_inner_dimension() {
        let a = Matrix::new(1, 2, vec![1.0, 2.0]);
        let b = Matrix::new(3, 1, vec![1.0, 1.0, 1.0]);
        assert!(a.matmul(&b).is_err());
    }

    #[test]
    fn row_and_column_selection() {
        let m = Matrix::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.row(0).unwrap().as_slice(), &[1.0, 2.0]);
        assert_eq!(m.column(1).unwrap().as_slice(), &[2.0, 4.0]);
    }
}
