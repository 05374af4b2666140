use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};

use super::Backend;

/// Explicit loops, rows spread over the rayon pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reference;

impl Backend for Reference {
    fn dot(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        let mut acc = 0.;
        for k in 0..x.len() {
            acc += x[k] * y[k];
        }

        acc
    }

    fn matvec(&self, a: ArrayView2<f64>, x: ArrayView1<f64>, y: ArrayViewMut1<f64>) {
        Zip::from(y)
            .and(a.rows())
            .par_for_each(|yi, row| *yi = self.dot(row, x));
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
            .par_for_each(|mut row, &xi| {
                for j in 0..row.len() {
                    row[j] += alpha * xi * y[j];
                }
            });
    }

    fn scale(&self, mut a: ArrayViewMut2<f64>, alpha: f64) {
        a.par_mapv_inplace(|v| v * alpha);
    }

    fn axpy(&self, alpha: f64, x: ArrayView1<f64>, mut y: ArrayViewMut1<f64>) {
        for k in 0..y.len() {
            y[k] += alpha * x[k];
        }
    }

    fn add_scaled(&self, alpha: f64, x: ArrayView2<f64>, mut y: ArrayViewMut2<f64>) {
        Zip::from(y.rows_mut())
            .and(x.rows())
            .par_for_each(|y_row, x_row| self.axpy(alpha, x_row, y_row));
    }
}
