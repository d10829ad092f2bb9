//! Dense matrices over GF(2^8).

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::errors::*;
use crate::galois::{Element, Elt, FIELD_SIZE};

/// A `rows x cols` grid of field elements, stored row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Matrix {
	rows: usize,
	cols: usize,
	data: Vec<Element>,
}

impl Matrix {
	/// All-zero matrix.
	pub fn new(rows: usize, cols: usize) -> Self {
		Self { rows, cols, data: vec![Element::ZERO; rows * cols] }
	}

	pub fn identity(size: usize) -> Self {
		let mut m = Self::new(size, size);
		for i in 0..size {
			m[(i, i)] = Element::ONE;
		}
		m
	}

	/// Build from explicit rows, which must all have the same, nonzero width.
	pub fn from_rows<R: AsRef<[Elt]>>(rows: &[R]) -> Result<Self> {
		let cols = rows.first().map(|row| row.as_ref().len()).unwrap_or_default();
		if cols == 0 {
			return Err(Mismatch::Empty.into());
		}
		let mut data = Vec::with_capacity(rows.len() * cols);
		for (index, row) in rows.iter().enumerate() {
			let row = row.as_ref();
			if row.len() != cols {
				return Err(Mismatch::RaggedRows { index, have: row.len(), want: cols }.into());
			}
			data.extend(row.iter().copied().map(Element));
		}
		Ok(Self { rows: rows.len(), cols, data })
	}

	/// Entry `(r, c)` is `r^c`, so every row evaluates the monomials at a
	/// distinct point. At most 256 rows.
	pub fn vandermonde(rows: usize, cols: usize) -> Result<Self> {
		if rows > FIELD_SIZE {
			return Err(Mismatch::EvaluationPoints { rows, max: FIELD_SIZE }.into());
		}
		let mut m = Self::new(rows, cols);
		for r in 0..rows {
			for c in 0..cols {
				m[(r, c)] = Element(r as Elt).pow(c);
			}
		}
		Ok(m)
	}

	pub fn rows(&self) -> usize {
		self.rows
	}

	pub fn cols(&self) -> usize {
		self.cols
	}

	pub fn get(&self, r: usize, c: usize) -> Element {
		self[(r, c)]
	}

	pub fn set(&mut self, r: usize, c: usize, value: Element) {
		self[(r, c)] = value;
	}

	pub fn row(&self, r: usize) -> &[Element] {
		&self.data[r * self.cols..][..self.cols]
	}

	/// Row `r` as raw bytes, the form the coding loops consume.
	pub fn row_bytes(&self, r: usize) -> Vec<Elt> {
		self.row(r).iter().map(|e| e.0).collect()
	}

	pub fn swap_rows(&mut self, r1: usize, r2: usize) {
		if r1 == r2 {
			return;
		}
		let (lo, hi) = (r1.min(r2), r1.max(r2));
		let (head, tail) = self.data.split_at_mut(hi * self.cols);
		head[lo * self.cols..][..self.cols].swap_with_slice(&mut tail[..self.cols]);
	}

	/// `self * right`.
	pub fn times(&self, right: &Matrix) -> Result<Matrix> {
		if self.cols != right.rows {
			return Err(Mismatch::MatrixShape {
				left_rows: self.rows,
				left_cols: self.cols,
				right_rows: right.rows,
				right_cols: right.cols,
			}.into());
		}
		let mut result = Matrix::new(self.rows, right.cols);
		for r in 0..self.rows {
			for c in 0..right.cols {
				result[(r, c)] = (0..self.cols).fold(Element::ZERO, |acc, i| acc + self[(r, i)] * right[(i, c)]);
			}
		}
		Ok(result)
	}

	/// Concatenate `right` to the right of `self`.
	pub fn augment(&self, right: &Matrix) -> Result<Matrix> {
		if self.rows != right.rows {
			return Err(Mismatch::AugmentRows { left: self.rows, right: right.rows }.into());
		}
		let cols = self.cols + right.cols;
		let mut data = Vec::with_capacity(self.rows * cols);
		for r in 0..self.rows {
			data.extend_from_slice(self.row(r));
			data.extend_from_slice(right.row(r));
		}
		Ok(Matrix { rows: self.rows, cols, data })
	}

	/// Rows `rmin..rmax` and columns `cmin..cmax`.
	pub fn submatrix(&self, rmin: usize, cmin: usize, rmax: usize, cmax: usize) -> Result<Matrix> {
		if rmin > rmax || rmax > self.rows || cmin > cmax || cmax > self.cols {
			return Err(Mismatch::SubmatrixBounds { rmin, cmin, rmax, cmax, rows: self.rows, cols: self.cols }.into());
		}
		let cols = cmax - cmin;
		let mut data = Vec::with_capacity((rmax - rmin) * cols);
		for r in rmin..rmax {
			data.extend_from_slice(&self.row(r)[cmin..cmax]);
		}
		Ok(Matrix { rows: rmax - rmin, cols, data })
	}

	/// The square matrix made of the given rows, in the given order.
	pub fn select_rows(&self, indices: &[usize]) -> Result<Matrix> {
		if indices.len() != self.cols {
			return Err(Mismatch::RowSelection { selected: indices.len(), cols: self.cols }.into());
		}
		let mut data = Vec::with_capacity(indices.len() * self.cols);
		for &index in indices {
			if index >= self.rows {
				return Err(Mismatch::RowIndex { index, rows: self.rows }.into());
			}
			data.extend_from_slice(self.row(index));
		}
		Ok(Matrix { rows: indices.len(), cols: self.cols, data })
	}

	/// Inverse by Gauss-Jordan elimination on `[self | I]`.
	///
	/// Fails with [`Error::Singular`] if some column has no nonzero pivot left.
	pub fn invert(&self) -> Result<Matrix> {
		if self.rows != self.cols {
			return Err(Mismatch::NotSquare { rows: self.rows, cols: self.cols }.into());
		}
		let mut work = self.augment(&Matrix::identity(self.rows))?;
		work.gaussian_elimination()?;
		work.submatrix(0, self.rows, self.rows, self.cols * 2)
	}

	/// Reduce the left square part to the identity.
	fn gaussian_elimination(&mut self) -> Result<()> {
		for col in 0..self.rows {
			let pivot = (col..self.rows).find(|&r| self[(r, col)] != Element::ZERO).ok_or(Error::Singular)?;
			self.swap_rows(col, pivot);

			let scale = self[(col, col)].inverse()?;
			if scale != Element::ONE {
				for c in 0..self.cols {
					self[(col, c)] *= scale;
				}
			}

			for r in 0..self.rows {
				if r == col {
					continue;
				}
				let factor = self[(r, col)];
				if factor == Element::ZERO {
					continue;
				}
				for c in col..self.cols {
					let v = factor * self[(col, c)];
					self[(r, c)] += v;
				}
			}
		}
		Ok(())
	}
}

impl Index<(usize, usize)> for Matrix {
	type Output = Element;

	fn index(&self, (r, c): (usize, usize)) -> &Element {
		debug_assert!(c < self.cols);
		&self.data[r * self.cols + c]
	}
}

impl IndexMut<(usize, usize)> for Matrix {
	fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut Element {
		debug_assert!(c < self.cols);
		&mut self.data[r * self.cols + c]
	}
}

impl fmt::Display for Matrix {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for r in 0..self.rows {
			if r > 0 {
				f.write_str(", ")?;
			}
			f.write_str("[")?;
			for (c, e) in self.row(r).iter().enumerate() {
				if c > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{}", e)?;
			}
			f.write_str("]")?;
		}
		f.write_str("]")
	}
}

impl fmt::Debug for Matrix {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}
