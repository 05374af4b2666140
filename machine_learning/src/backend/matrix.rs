use ndarray::{
    ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis,
    linalg::{general_mat_mul, general_mat_vec_mul},
};

use super::Backend;

/// Whole matrix operations through `ndarray::linalg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatrixBlas;

impl Backend for MatrixBlas {
    fn dot(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        x.dot(&y)
    }

    fn matvec(&self, a: ArrayView2<f64>, x: ArrayView1<f64>, mut y: ArrayViewMut1<f64>) {
        general_mat_vec_mul(1.0, &a, &x, 0.0, &mut y);
    }

    fn outer_update(
        &self,
        alpha: f64,
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        mut a: ArrayViewMut2<f64>,
    ) {
        let x = x.insert_axis(Axis(1));
        let y = y.insert_axis(Axis(0));
        general_mat_mul(alpha, &x, &y, 1.0, &mut a);
    }

    fn scale(&self, mut a: ArrayViewMut2<f64>, alpha: f64) {
        a *= alpha;
    }

    fn axpy(&self, alpha: f64, x: ArrayView1<f64>, mut y: ArrayViewMut1<f64>) {
        y.scaled_add(alpha, &x);
    }

    fn add_scaled(&self, alpha: f64, x: ArrayView2<f64>, mut y: ArrayViewMut2<f64>) {
        y.scaled_add(alpha, &x);
    }
}
