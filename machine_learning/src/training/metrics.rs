//! Metrics reported while fitting a model.

use ndarray::{ArrayView1, ArrayView2, Zip};

/// Counts the rows where the prediction agrees with the expected output.
///
/// Rows with a single column are compared thresholded at 0.5, wider rows by the index of
/// their maximum.
pub fn correct(y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> usize {
    if y.ncols() == 1 {
        return Zip::from(y_pred.column(0))
            .and(y.column(0))
            .fold(0, |acc, &p, &t| acc + ((p >= 0.5) == (t >= 0.5)) as usize);
    }

    y_pred
        .rows()
        .into_iter()
        .zip(y.rows())
        .filter(|(p, t)| argmax(*p) == argmax(*t))
        .count()
}

/// The fraction of rows predicted correctly.
pub fn accuracy(y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
    if y.nrows() == 0 {
        return 0.;
    }

    correct(y_pred, y) as f32 / y.nrows() as f32
}

/// The index of the first maximum of `v`.
pub fn argmax(v: ArrayView1<f32>) -> Option<usize> {
    v.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &x)| match best {
            Some((_, m)) if m >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}
