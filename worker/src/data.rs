use machine_learning::{MlErr, dataset::Row};
use ndarray::Array2;

use crate::{Result, WorkerErr};

/// Builds the feature and label matrices of a partition in a single pass over its rows.
///
/// # Arguments
/// * `rows` - The rows of the partition.
/// * `features_col` - The column holding the input of every row.
/// * `label_col` - The column holding the expected output of every row.
///
/// # Returns
/// `(x, y)` with one row per input row, `MissingColumn` if a row lacks either column or a
/// `SizeMismatch` if the rows don't all have the same widths.
pub fn rows_to_matrices(
    rows: &[Row],
    features_col: &str,
    label_col: &str,
) -> Result<(Array2<f32>, Array2<f32>)> {
    let mut widths = None;
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let x = column(row, i, features_col)?;
        let y = column(row, i, label_col)?;

        let (x_width, y_width) = *widths.get_or_insert((x.len(), y.len()));
        check_width("features", x.len(), x_width)?;
        check_width("labels", y.len(), y_width)?;

        xs.extend_from_slice(x);
        ys.extend_from_slice(y);
    }

    let (x_width, y_width) = widths.unwrap_or_default();
    let x = Array2::from_shape_vec((rows.len(), x_width), xs).map_err(shape_err)?;
    let y = Array2::from_shape_vec((rows.len(), y_width), ys).map_err(shape_err)?;

    Ok((x, y))
}

fn column<'a>(row: &'a Row, i: usize, name: &str) -> Result<&'a [f32]> {
    row.get(name)
        .map(|value| value.as_slice())
        .ok_or_else(|| WorkerErr::MissingColumn {
            column: name.to_string(),
            row: i,
        })
}

fn check_width(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            what,
            got,
            expected,
        }
        .into());
    }

    Ok(())
}

fn shape_err(e: ndarray::ShapeError) -> WorkerErr {
    MlErr::Codec(std::io::Error::new(std::io::ErrorKind::InvalidData, e)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(features: Vec<f32>, label: Vec<f32>) -> Row {
        Row::new().with("features", features).with("label", label)
    }

    #[test]
    fn one_matrix_row_per_input_row() {
        let rows = [
            row(vec![1., 2., 3.], vec![0., 1.]),
            row(vec![4., 5., 6.], vec![1., 0.]),
        ];

        let (x, y) = rows_to_matrices(&rows, "features", "label").unwrap();

        assert_eq!(x.dim(), (2, 3));
        assert_eq!(y.dim(), (2, 2));
        assert_eq!(x.row(1).to_vec(), [4., 5., 6.]);
        assert_eq!(y.row(0).to_vec(), [0., 1.]);
    }

    #[test]
    fn missing_label_is_reported_with_its_row() {
        let rows = [
            row(vec![1.], vec![1.]),
            Row::new().with("features", vec![2f32]),
        ];

        let err = rows_to_matrices(&rows, "features", "label").unwrap_err();
        assert!(matches!(
            err,
            WorkerErr::MissingColumn { ref column, row: 1 } if column == "label"
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = [row(vec![1., 2.], vec![1.]), row(vec![1.], vec![1.])];

        assert!(matches!(
            rows_to_matrices(&rows, "features", "label"),
            Err(WorkerErr::Ml(MlErr::SizeMismatch { .. }))
        ));
    }

    #[test]
    fn no_rows_no_matrix() {
        let (x, y) = rows_to_matrices(&[], "features", "label").unwrap();
        assert_eq!(x.nrows(), 0);
        assert_eq!(y.nrows(), 0);
    }
}
