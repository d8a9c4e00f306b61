use ndarray::{Array2, ArrayView2, Axis, Zip};

/// Row-wise softmax, every row of the output is a probability distribution.
#[derive(Clone, Copy, Debug, Default)]
pub struct Softmax;

impl Softmax {
    pub fn f(&self, z: ArrayView2<f32>) -> Array2<f32> {
        let mut a = z.to_owned();

        for mut row in a.axis_iter_mut(Axis(0)) {
            let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            row.mapv_inplace(|v| (v - max).exp());

            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }

        a
    }

    /// Back propagates `d` through the softmax given its output `a`.
    ///
    /// Per row `dz_i = a_i * (d_i - sum_j(d_j * a_j))`.
    pub fn df(&self, mut d: Array2<f32>, a: ArrayView2<f32>) -> Array2<f32> {
        Zip::from(d.axis_iter_mut(Axis(0)))
            .and(a.axis_iter(Axis(0)))
            .for_each(|mut d, a| {
                let dot = d.dot(&a);
                d.zip_mut_with(&a, |d, &a| *d = a * (*d - dot));
            });

        d
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn rows_sum_to_one() {
        let z = array![[1., 2., 3.], [1000., 1000., 1000.]];
        let a = Softmax.f(z.view());

        for row in a.rows() {
            assert!((row.sum() - 1.).abs() < 1e-6);
        }

        assert!((a[[1, 0]] - 1. / 3.).abs() < 1e-6);
        assert!(a[[0, 2]] > a[[0, 1]]);
    }

    #[test]
    fn gradient_of_uniform_upstream_vanishes() {
        let z = array![[0.5, -1., 2.]];
        let a = Softmax.f(z.view());
        let d = Softmax.df(Array2::ones((1, 3)), a.view());

        assert!(d.iter().all(|v| v.abs() < 1e-6));
    }
}
