use std::cmp::Ordering;

use crate::options::RowOrder;
use crate::FundamentError as Error;
use crate::MatchingMatrix;

/// Compares rows by the positions of their non-zero entries: at the first column where exactly
/// one of the two rows is non-zero, that row comes first.
fn positional_cmp(matrix: &MatchingMatrix, a: usize, b: usize) -> Ordering {
    for (x, y) in matrix.row(a).iter().zip(matrix.row(b)) {
        match (x.is_zero(), y.is_zero()) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Processing order of the matching equations: the first `initial_rows` rows as given, then the
/// rest in `order`.
pub fn row_sequence(
    matrix: &MatchingMatrix,
    initial_rows: usize,
    order: RowOrder,
) -> Result<Vec<usize>, Error> {
    let rows = matrix.row_count();
    if initial_rows > rows {
        return Err(Error::invalid(format!(
            "initial_rows {initial_rows} exceeds the {rows} matching equations"
        )));
    }
    let mut sequence: Vec<usize> = (0..rows).collect();
    if order == RowOrder::Positional {
        sequence[initial_rows..].sort_by(|&a, &b| positional_cmp(matrix, a, b));
    }
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::row_sequence;
    use crate::options::RowOrder;
    use crate::MatchingMatrix;

    fn matrix() -> MatchingMatrix {
        MatchingMatrix::from_i64_rows(
            4,
            &[
                [0i64, 0, 1, -1],
                [1, -1, 0, 0],
                [0, 1, 0, -1],
                [1, 0, 0, -1],
            ],
        )
        .unwrap()
    }

    #[test]
    fn positional_order_prefers_early_non_zeros() {
        let m = matrix();
        assert_eq!(
            row_sequence(&m, 0, RowOrder::Positional).unwrap(),
            vec![1, 3, 2, 0]
        );
        assert_eq!(
            row_sequence(&m, 0, RowOrder::AsGiven).unwrap(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn initial_rows_stay_in_front() {
        let m = matrix();
        assert_eq!(
            row_sequence(&m, 1, RowOrder::Positional).unwrap(),
            vec![0, 1, 3, 2]
        );
        assert!(row_sequence(&m, 5, RowOrder::Positional).is_err());
    }
}
