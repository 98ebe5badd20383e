use rand::Rng;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub, SubAssign};

/// Dense row-major matrix of `f64`.
///
/// When used as a linear layer's weight, rows are the output dimension and
/// columns the input dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Samples every entry uniformly from `[-1, 1)`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let data = (0..rows * cols).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Matrix { rows, cols, data }
    }

    /// Builds a matrix from row-major storage.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Matrix {
        assert_eq!(
            data.len(),
            rows * cols,
            "Matrix::from_vec: {} values do not fill a {}x{} matrix",
            data.len(),
            rows,
            cols
        );
        Matrix { rows, cols, data }
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Matrix {
        let cols = rows.first().map_or(0, |r| r.len());
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "Matrix::from_rows: ragged rows"
        );
        let n_rows = rows.len();
        Matrix::from_vec(n_rows, cols, rows.into_iter().flatten().collect())
    }

    /// Square matrix with `diag` on the main diagonal.
    pub fn diagonal(diag: &[f64]) -> Matrix {
        let n = diag.len();
        let mut res = Matrix::zeros(n, n);
        for (i, &d) in diag.iter().enumerate() {
            res[(i, i)] = d;
        }
        res
    }

    /// Outer product `a * b^T`.
    pub fn outer(a: &[f64], b: &[f64]) -> Matrix {
        let mut res = Matrix::zeros(a.len(), b.len());
        res.add_outer(a, b);
        res
    }

    /// Row-major view of the entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// `self * x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(
            self.cols,
            x.len(),
            "Matrix::mul_vec: {}x{} matrix times vector of length {}",
            self.rows,
            self.cols,
            x.len()
        );
        (0..self.rows)
            .map(|i| self.row(i).iter().zip(x).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// `self^T * x`, without materialising the transpose.
    pub fn transpose_mul_vec(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(
            self.rows,
            x.len(),
            "Matrix::transpose_mul_vec: {}x{} matrix (transposed) times vector of length {}",
            self.rows,
            self.cols,
            x.len()
        );
        let mut res = vec![0.0; self.cols];
        for (i, &xi) in x.iter().enumerate() {
            for (r, &a) in res.iter_mut().zip(self.row(i)) {
                *r += a * xi;
            }
        }
        res
    }

    /// `self += a * b^T`.
    pub fn add_outer(&mut self, a: &[f64], b: &[f64]) {
        assert_eq!(self.rows, a.len(), "Matrix::add_outer: row count mismatch");
        assert_eq!(self.cols, b.len(), "Matrix::add_outer: column count mismatch");
        for (i, &ai) in a.iter().enumerate() {
            let cols = self.cols;
            let row = &mut self.data[i * cols..(i + 1) * cols];
            for (r, &bj) in row.iter_mut().zip(b) {
                *r += ai * bj;
            }
        }
    }

    /// `self -= other * factor`.
    pub fn sub_scaled(&mut self, other: &Matrix, factor: f64) {
        self.assert_same_shape(other);
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a -= b * factor;
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    fn assert_same_shape(&self, other: &Matrix) {
        if self.rows != other.rows || self.cols != other.cols {
            panic!(
                "Matrices are of incorrect sizes: {}x{} vs {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(i < self.rows && j < self.cols, "Matrix index ({i}, {j}) out of bounds");
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(i < self.rows && j < self.cols, "Matrix index ({i}, {j}) out of bounds");
        &mut self.data[i * self.cols + j]
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        self.assert_same_shape(rhs);
        for (a, b) in self.data.iter_mut().zip(&rhs.data) {
            *a += b;
        }
    }
}

impl SubAssign<&Matrix> for Matrix {
    fn sub_assign(&mut self, rhs: &Matrix) {
        self.assert_same_shape(rhs);
        for (a, b) in self.data.iter_mut().zip(&rhs.data) {
            *a -= b;
        }
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += &rhs;
        self
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(mut self, rhs: Self) -> Self::Output {
        self -= &rhs;
        self
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self[(i, k)] * rhs[(k, j)];
                }

                res[(i, j)] = sum;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_vec_matches_matrix_product() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(m.mul_vec(&[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);

        let x = Matrix::from_rows(vec![vec![1.0], vec![0.0], vec![-1.0]]);
        assert_eq!((&m * &x).as_slice(), &[-2.0, -2.0]);
    }

    #[test]
    fn transpose_mul_vec_multiplies_by_the_transpose() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let x = [0.5, -1.0];
        assert_eq!(m.transpose_mul_vec(&x), vec![-3.5, -4.0, -4.5]);
    }

    #[test]
    fn outer_and_diagonal() {
        let o = Matrix::outer(&[1.0, 2.0], &[3.0, 4.0, 5.0]);
        assert_eq!(o.rows, 2);
        assert_eq!(o.cols, 3);
        assert_eq!(o.row(1), &[6.0, 8.0, 10.0]);

        let d = Matrix::diagonal(&[1.0, 2.0]);
        assert_eq!(d.as_slice(), &[1.0, 0.0, 0.0, 2.0]);
        assert_eq!((d - Matrix::diagonal(&[1.0, 1.0])).as_slice(), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn random_entries_are_in_unit_interval() {
        let mut rng = rand::thread_rng();
        let m = Matrix::random(8, 8, &mut rng);
        assert!(m.as_slice().iter().all(|x| (-1.0..1.0).contains(x)));
    }

    #[test]
    #[should_panic]
    fn mul_vec_rejects_wrong_length() {
        Matrix::zeros(2, 3).mul_vec(&[1.0, 2.0]);
    }
}
