mod matrix;
mod reference;
mod vector;

use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

pub use matrix::MatrixBlas;
pub use reference::Reference;
pub use vector::VectorBlas;

/// The linear algebra primitives every engine is written against.
///
/// Conforming implementations agree up to floating point rounding, each one is bit for bit
/// reproducible on its own.
pub trait Backend: Send + Sync {
    /// `x · y`.
    fn dot(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64;

    /// `y = a x`, overwriting `y`.
    fn matvec(&self, a: ArrayView2<f64>, x: ArrayView1<f64>, y: ArrayViewMut1<f64>);

    /// `a += alpha * x yᵀ`.
    fn outer_update(
        &self,
        alpha: f64,
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        a: ArrayViewMut2<f64>,
    );

    /// `a *= alpha`.
    fn scale(&self, a: ArrayViewMut2<f64>, alpha: f64);

    /// `y += alpha * x`.
    fn axpy(&self, alpha: f64, x: ArrayView1<f64>, y: ArrayViewMut1<f64>);

    /// `y += alpha * x` over matrices of the same shape, one row at a time.
    fn add_scaled(&self, alpha: f64, x: ArrayView2<f64>, mut y: ArrayViewMut2<f64>) {
        for (x_row, y_row) in x.rows().into_iter().zip(y.rows_mut()) {
            self.axpy(alpha, x_row, y_row);
        }
    }
}

/// The backend chosen when configuring a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Plain loops.
    #[default]
    Reference,
    /// Row level dot products and axpys.
    Vector,
    /// Whole matrix-vector and rank one products.
    Matrix,
}

impl Backend for BackendKind {
    fn dot(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        match self {
            BackendKind::Reference => Reference.dot(x, y),
            BackendKind::Vector => VectorBlas.dot(x, y),
            BackendKind::Matrix => MatrixBlas.dot(x, y),
        }
    }

    fn matvec(&self, a: ArrayView2<f64>, x: ArrayView1<f64>, y: ArrayViewMut1<f64>) {
        match self {
            BackendKind::Reference => Reference.matvec(a, x, y),
            BackendKind::Vector => VectorBlas.matvec(a, x, y),
            BackendKind::Matrix => MatrixBlas.matvec(a, x, y),
        }
    }

    fn outer_update(
        &self,
        alpha: f64,
        x: ArrayView1<f64>,
        y: ArrayView1<f64>,
        a: ArrayViewMut2<f64>,
    ) {
        match self {
            BackendKind::Reference => Reference.outer_update(alpha, x, y, a),
            BackendKind::Vector => VectorBlas.outer_update(alpha, x, y, a),
            BackendKind::Matrix => MatrixBlas.outer_update(alpha, x, y, a),
        }
    }

    fn scale(&self, a: ArrayViewMut2<f64>, alpha: f64) {
        match self {
            BackendKind::Reference => Reference.scale(a, alpha),
            BackendKind::Vector => VectorBlas.scale(a, alpha),
            BackendKind::Matrix => MatrixBlas.scale(a, alpha),
        }
    }

    fn axpy(&self, alpha: f64, x: ArrayView1<f64>, y: ArrayViewMut1<f64>) {
        match self {
            BackendKind::Reference => Reference.axpy(alpha, x, y),
            BackendKind::Vector => VectorBlas.axpy(alpha, x, y),
            BackendKind::Matrix => MatrixBlas.axpy(alpha, x, y),
        }
    }

    fn add_scaled(&self, alpha: f64, x: ArrayView2<f64>, y: ArrayViewMut2<f64>) {
        match self {
            BackendKind::Reference => Reference.add_scaled(alpha, x, y),
            BackendKind::Vector => VectorBlas.add_scaled(alpha, x, y),
            BackendKind::Matrix => MatrixBlas.add_scaled(alpha, x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    const TOL: f64 = 1e-10;
    const KINDS: [BackendKind; 3] = [
        BackendKind::Reference,
        BackendKind::Vector,
        BackendKind::Matrix,
    ];

    fn random_matrix(rng: &mut StdRng, n: usize, m: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, m), |_| rng.random_range(-1.0..1.0))
    }

    fn random_vector(rng: &mut StdRng, n: usize) -> Array1<f64> {
        Array1::from_shape_fn(n, |_| rng.random_range(-1.0..1.0))
    }

    fn close(a: &Array2<f64>, b: &Array2<f64>) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < TOL)
    }

    #[test]
    fn dot_agrees() {
        let mut rng = StdRng::seed_from_u64(1);
        let x = random_vector(&mut rng, 37);
        let y = random_vector(&mut rng, 37);
        let expected: f64 = x.iter().zip(&y).map(|(a, b)| a * b).sum();

        for kind in KINDS {
            assert!((kind.dot(x.view(), y.view()) - expected).abs() < TOL, "{kind:?}");
        }
    }

    #[test]
    fn matvec_agrees_on_transposed_views() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = random_matrix(&mut rng, 9, 5);
        let x = random_vector(&mut rng, 9);

        let mut expected = Array1::zeros(5);
        Reference.matvec(a.t(), x.view(), expected.view_mut());

        for kind in KINDS {
            let mut y = Array1::from_elem(5, f64::NAN);
            kind.matvec(a.t(), x.view(), y.view_mut());

            let expected_col: f64 = (0..9).map(|i| a[[i, 3]] * x[i]).sum();
            assert!((y[3] - expected_col).abs() < TOL, "{kind:?}");
            assert!(y.iter().zip(&expected).all(|(a, b)| (a - b).abs() < TOL));
        }
    }

    #[test]
    fn outer_update_agrees() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = random_matrix(&mut rng, 4, 6);
        let x = random_vector(&mut rng, 4);
        let y = random_vector(&mut rng, 6);

        let mut expected = a.clone();
        for i in 0..4 {
            for j in 0..6 {
                expected[[i, j]] += 0.01 * x[i] * y[j];
            }
        }

        for kind in KINDS {
            let mut got = a.clone();
            kind.outer_update(0.01, x.view(), y.view(), got.view_mut());
            assert!(close(&got, &expected), "{kind:?}");
        }
    }

    #[test]
    fn scale_and_add_scaled_agree() {
        let mut rng = StdRng::seed_from_u64(4);
        let a = random_matrix(&mut rng, 3, 7);
        let b = random_matrix(&mut rng, 3, 7);

        for kind in KINDS {
            let mut scaled = a.clone();
            kind.scale(scaled.view_mut(), 0.2);
            assert!(close(&scaled, &(&a * 0.2)), "{kind:?}");

            let mut summed = b.clone();
            kind.add_scaled(1.0, a.view(), summed.view_mut());
            assert!(close(&summed, &(&a + &b)), "{kind:?}");
        }
    }

    #[test]
    fn axpy_agrees() {
        let mut rng = StdRng::seed_from_u64(5);
        let x = random_vector(&mut rng, 11);
        let y = random_vector(&mut rng, 11);

        for kind in KINDS {
            let mut got = y.clone();
            kind.axpy(-0.5, x.view(), got.view_mut());
            assert!(got.iter().zip(x.iter().zip(&y)).all(|(g, (a, b))| (g - (b - 0.5 * a)).abs() < TOL));
        }
    }
}
