use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};

use super::Backend;

/// Matrix work broken into row level dot products and axpys.
#[derive(Debug, Default, Clone, Copy)]
pub struct VectorBlas;

impl Backend for VectorBlas {
    fn dot(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        x.dot(&y)
    }

    fn matvec(&self, a: ArrayView2<f64>, x: ArrayView1<f64>, y: ArrayViewMut1<f64>) {
        Zip::from(y)
            .and(a.rows())
            .par_for_each(|yi, row| *yi = row.dot(&x));
    }

    fn outer_update(
        &self,
        alpha: f64,
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        mut a: ArrayViewMut2<f64>,
    ) {
        Zip::from(a.rows_mut())
            .and(&x)
            .par_for_each(|mut row, &xi| row.scaled_add(alpha * xi, &y));
    }

    fn scale(&self, mut a: ArrayViewMut2<f64>, alpha: f64) {
        Zip::from(a.rows_mut()).par_for_each(|mut row| row *= alpha);
    }

    fn axpy(&self, alpha: f64, x: ArrayView1<f64>, mut y: ArrayViewMut1<f64>) {
        y.scaled_add(alpha, &x);
    }
}
