use crate::FundamentError as Error;
use quadrille_core::{Integer, Vector};

/// Dense row-major integer matrix of matching equations; a vector `x` is a solution iff `Mx = 0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MatchingMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Integer>,
}

impl MatchingMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<Integer>) -> Result<Self, Error> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::invalid("matching matrix size overflows usize"))?;
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// No equations over `cols` coordinates.
    pub fn empty(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    pub fn from_rows(cols: usize, rows: Vec<Vec<Integer>>) -> Result<Self, Error> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        let count = rows.len();
        for row in rows {
            if row.len() != cols {
                return Err(Error::DimensionMismatch {
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Self::new(count, cols, data)
    }

    pub fn from_i64_rows<R: AsRef<[i64]>>(cols: usize, rows: &[R]) -> Result<Self, Error> {
        Self::from_rows(
            cols,
            rows.iter()
                .map(|row| row.as_ref().iter().copied().map(Integer::from).collect())
                .collect(),
        )
    }

    #[inline(always)]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn col_count(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Integer] {
        debug_assert!(row < self.rows, "row {row} out of range");
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Integer]> + '_ {
        (0..self.rows).map(move |row| self.row(row))
    }

    #[inline]
    pub fn entry(&self, row: usize, col: usize) -> &Integer {
        &self.row(row)[col]
    }

    pub fn is_zero_row(&self, row: usize) -> bool {
        self.row(row).iter().all(Integer::is_zero)
    }

    /// `Mx`, one entry per equation.
    pub fn apply(&self, x: &Vector<Integer>) -> Result<Vec<Integer>, Error> {
        self.rows()
            .map(|row| x.dot_slice(row).map_err(Error::from))
            .collect()
    }

    pub fn annihilates(&self, x: &Vector<Integer>) -> Result<bool, Error> {
        Ok(self.apply(x)?.iter().all(Integer::is_zero))
    }

    /// Keeps only `columns`, in the given order. Rows that become zero are kept.
    pub fn select_columns(&self, columns: &[usize]) -> Result<Self, Error> {
        let mut seen = vec![false; self.cols];
        for &col in columns {
            if col >= self.cols {
                return Err(Error::invalid(format!(
                    "select_columns column {col} out of bounds for {} columns",
                    self.cols
                )));
            }
            if std::mem::replace(&mut seen[col], true) {
                return Err(Error::invalid("select_columns requires unique columns"));
            }
        }
        let mut data = Vec::with_capacity(self.rows * columns.len());
        for row in self.rows() {
            for &col in columns {
                data.push(row[col].clone());
            }
        }
        Ok(Self {
            rows: self.rows,
            cols: columns.len(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MatchingMatrix;
    use crate::FundamentError;
    use quadrille_core::{Integer, Vector};

    #[test]
    fn rows_and_products() {
        let m = MatchingMatrix::from_i64_rows(3, &[[1i64, -1, 0], [0, 0, 0]]).unwrap();
        assert_eq!(m.row_count(), 2);
        assert!(m.is_zero_row(1));
        assert!(!m.is_zero_row(0));
        assert!(m.annihilates(&Vector::from(vec![2, 2, 7])).unwrap());
        assert_eq!(
            m.apply(&Vector::from(vec![1, 0, 0])).unwrap(),
            vec![Integer::one(), Integer::zero()]
        );
        assert_eq!(
            m.apply(&Vector::from(vec![1, 0])),
            Err(FundamentError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = MatchingMatrix::from_i64_rows(3, &[vec![1i64, 2, 3], vec![1]]).unwrap_err();
        assert_eq!(
            err,
            FundamentError::DimensionMismatch {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn column_selection() {
        let m = MatchingMatrix::from_i64_rows(4, &[[1i64, 2, 3, 4]]).unwrap();
        let s = m.select_columns(&[3, 1]).unwrap();
        assert_eq!(s.row(0), &[Integer::from(4), Integer::from(2)]);
        assert!(m.select_columns(&[0, 0]).is_err());
        assert!(m.select_columns(&[4]).is_err());
        assert_eq!(MatchingMatrix::empty(3).rows().count(), 0);
    }
}
