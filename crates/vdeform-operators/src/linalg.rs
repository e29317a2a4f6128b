//! Small sparse/dense helpers shared by the solver crates.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CscMatrix};
use vdeform_math::Point3;

/// `diag(s) * a`.
pub fn scale_rows(a: &CscMatrix<f64>, s: &DVector<f64>) -> CscMatrix<f64> {
    debug_assert_eq!(a.nrows(), s.len());
    let mut coo = CooMatrix::new(a.nrows(), a.ncols());
    for (i, j, v) in a.triplet_iter() {
        coo.push(i, j, v * s[i]);
    }
    CscMatrix::from(&coo)
}

/// Largest absolute difference between `a` and its transpose.
pub fn asymmetry(a: &CscMatrix<f64>) -> f64 {
    let dense_a = dense(a);
    (&dense_a - dense_a.transpose()).amax()
}

/// Dense copy of a sparse matrix. Intended for tests and small meshes.
pub fn dense(a: &CscMatrix<f64>) -> DMatrix<f64> {
    let mut m = DMatrix::zeros(a.nrows(), a.ncols());
    for (i, j, v) in a.triplet_iter() {
        m[(i, j)] += *v;
    }
    m
}

/// Stack positions into a `n × 3` matrix.
pub fn positions_to_matrix(positions: &[Point3]) -> DMatrix<f64> {
    DMatrix::from_fn(positions.len(), 3, |i, c| positions[i][c])
}

/// Unstack a `n × 3` matrix into positions.
pub fn matrix_to_positions(m: &DMatrix<f64>) -> Vec<Point3> {
    (0..m.nrows())
        .map(|i| Point3::new(m[(i, 0)], m[(i, 1)], m[(i, 2)]))
        .collect()
}
