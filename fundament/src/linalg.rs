//! Exact linear algebra used by the bundled Hilbert basis solver.
//!
//! Determinants are fraction-free (Bareiss); inverses go through exact rationals and are returned
//! scaled by the determinant so that callers stay in integer arithmetic.

use crate::FundamentError as Error;
use quadrille_core::{ArithmeticError, Integer, Rational, Vector};

/// Dense square integer matrix, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<Integer>,
}

impl SquareMatrix {
    /// Builds the matrix whose `j`-th column is `columns[j]`.
    pub fn from_columns<C: AsRef<[Integer]>>(columns: &[C]) -> Result<Self, Error> {
        let n = columns.len();
        let mut data = vec![Integer::zero(); n * n];
        for (j, column) in columns.iter().enumerate() {
            let column = column.as_ref();
            if column.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: column.len(),
                });
            }
            for (i, x) in column.iter().enumerate() {
                data[i * n + j] = x.clone();
            }
        }
        Ok(Self { n, data })
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> &Integer {
        &self.data[row * self.n + col]
    }

    pub fn column(&self, col: usize) -> Vec<Integer> {
        (0..self.n).map(|row| self.get(row, col).clone()).collect()
    }

    pub fn mul_vec(&self, x: &[Integer]) -> Vec<Integer> {
        debug_assert_eq!(x.len(), self.n, "matrix/vector width mismatch");
        (0..self.n)
            .map(|row| {
                let mut acc = Integer::zero();
                for (a, b) in self.data[row * self.n..(row + 1) * self.n].iter().zip(x) {
                    if !a.is_zero() && !b.is_zero() {
                        acc += a * b;
                    }
                }
                acc
            })
            .collect()
    }

    /// Bareiss fraction-free elimination; every division is exact.
    pub fn determinant(&self) -> Result<Integer, Error> {
        let n = self.n;
        if n == 0 {
            return Ok(Integer::one());
        }
        let mut a = self.data.clone();
        let mut negate = false;
        let mut prev = Integer::one();
        for k in 0..n {
            if a[k * n + k].is_zero() {
                let Some(pivot) = (k + 1..n).find(|&i| !a[i * n + k].is_zero()) else {
                    return Ok(Integer::zero());
                };
                for j in 0..n {
                    a.swap(k * n + j, pivot * n + j);
                }
                negate = !negate;
            }
            for i in k + 1..n {
                for j in k + 1..n {
                    let lhs = &a[k * n + k] * &a[i * n + j];
                    let rhs = &a[i * n + k] * &a[k * n + j];
                    a[i * n + j] = (lhs - rhs).div_exact(&prev)?;
                }
            }
            prev = a[k * n + k].clone();
        }
        let mut det = a[n * n - 1].clone();
        if negate {
            det.negate();
        }
        Ok(det)
    }

    /// Gauss-Jordan inverse over the rationals; `None` if singular.
    pub fn inverse(&self) -> Result<Option<Vec<Rational>>, Error> {
        let n = self.n;
        let width = 2 * n;
        let mut m: Vec<Vec<Rational>> = (0..n)
            .map(|i| {
                let mut row: Vec<Rational> = self.data[i * n..(i + 1) * n]
                    .iter()
                    .map(Rational::from)
                    .collect();
                row.extend((0..n).map(|j| {
                    if i == j {
                        Rational::one()
                    } else {
                        Rational::zero()
                    }
                }));
                row
            })
            .collect();
        for col in 0..n {
            let Some(pivot) = (col..n).find(|&r| !m[r][col].is_zero()) else {
                return Ok(None);
            };
            m.swap(col, pivot);
            let p = m[col][col].clone();
            for x in m[col].iter_mut() {
                *x = x.checked_div(&p)?;
            }
            let pivot_row = m[col].clone();
            for (r, row) in m.iter_mut().enumerate() {
                if r == col || row[col].is_zero() {
                    continue;
                }
                let factor = row[col].clone();
                for j in 0..width {
                    if !pivot_row[j].is_zero() {
                        row[j] -= &factor * &pivot_row[j];
                    }
                }
            }
        }
        Ok(Some(
            m.into_iter()
                .flat_map(|row| row.into_iter().skip(n))
                .collect(),
        ))
    }

    /// `(det, det * self^-1)` with `det > 0`; `None` if singular.
    pub fn scaled_inverse(&self) -> Result<Option<(Integer, SquareMatrix)>, Error> {
        let mut det = self.determinant()?;
        if det.is_zero() {
            return Ok(None);
        }
        let Some(inverse) = self.inverse()? else {
            return Ok(None);
        };
        let det_q = Rational::from(&det);
        let mut data = Vec::with_capacity(inverse.len());
        for x in &inverse {
            let scaled = &det_q * x;
            data.push(
                scaled
                    .to_integer()
                    .ok_or(Error::Arithmetic(ArithmeticError::InexactDivision))?,
            );
        }
        if det.is_negative() {
            det.negate();
            for x in &mut data {
                x.negate();
            }
        }
        Ok(Some((det, SquareMatrix { n: self.n, data })))
    }
}

/// Column indices of a row echelon form of `rows`, i.e. a set of coordinates onto which the row
/// span projects isomorphically. Its length is the rank.
pub fn pivot_columns(rows: &[Vector<Integer>]) -> Result<Vec<usize>, Error> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let cols = first.len();
    let mut m: Vec<Vec<Rational>> = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() != cols {
            return Err(Error::DimensionMismatch {
                expected: cols,
                found: row.len(),
            });
        }
        m.push(row.iter().map(Rational::from).collect());
    }
    let mut pivots = Vec::new();
    let mut rank = 0;
    for col in 0..cols {
        if rank == m.len() {
            break;
        }
        let Some(pivot) = (rank..m.len()).find(|&r| !m[r][col].is_zero()) else {
            continue;
        };
        m.swap(rank, pivot);
        let pivot_row = m[rank].clone();
        for row in m.iter_mut().skip(rank + 1) {
            if row[col].is_zero() {
                continue;
            }
            let factor = row[col].checked_div(&pivot_row[col])?;
            for j in col..cols {
                if !pivot_row[j].is_zero() {
                    row[j] -= &factor * &pivot_row[j];
                }
            }
        }
        pivots.push(col);
        rank += 1;
    }
    Ok(pivots)
}

/// `(g, s, t)` with `g = gcd(a, b) >= 0` and `s*a + t*b = g`.
pub fn extended_gcd(a: &Integer, b: &Integer) -> Result<(Integer, Integer, Integer), Error> {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (Integer::one(), Integer::zero());
    let (mut old_t, mut t) = (Integer::zero(), Integer::one());
    while !r.is_zero() {
        let (q, rem) = old_r.div_rem_floor(&r)?;
        old_r = std::mem::replace(&mut r, rem);
        let next_s = &old_s - &(&q * &s);
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = &old_t - &(&q * &t);
        old_t = std::mem::replace(&mut t, next_t);
    }
    if old_r.is_negative() {
        old_r.negate();
        old_s.negate();
        old_t.negate();
    }
    Ok((old_r, old_s, old_t))
}

/// Diagonal of a lower-triangular basis of the lattice spanned by `columns` (which must be
/// linearly independent and square).
///
/// The boxes `0 <= y_i < |h_i|` are then a complete set of coset representatives of
/// `Z^d / lattice`, and the product of the `|h_i|` is `|det|`.
pub fn triangular_lattice_diagonal(columns: &[Vec<Integer>]) -> Result<Vec<Integer>, Error> {
    let d = columns.len();
    let mut cols = columns.to_vec();
    if let Some(bad) = cols.iter().find(|c| c.len() != d) {
        return Err(Error::DimensionMismatch {
            expected: d,
            found: bad.len(),
        });
    }
    let mut diagonal = Vec::with_capacity(d);
    for i in 0..d {
        if cols[i][i].is_zero() {
            let Some(j) = (i + 1..d).find(|&j| !cols[j][i].is_zero()) else {
                return Err(Error::invalid("lattice basis columns are linearly dependent"));
            };
            cols.swap(i, j);
        }
        for j in i + 1..d {
            if cols[j][i].is_zero() {
                continue;
            }
            let a = cols[i][i].clone();
            let b = cols[j][i].clone();
            let (g, s, t) = extended_gcd(&a, &b)?;
            let a_g = a.div_exact(&g)?;
            let b_g = b.div_exact(&g)?;
            let (left, right) = cols.split_at_mut(j);
            let ci = &mut left[i];
            let cj = &mut right[0];
            for k in i..d {
                let new_i = &(&s * &ci[k]) + &(&t * &cj[k]);
                let new_j = &(&a_g * &cj[k]) - &(&b_g * &ci[k]);
                ci[k] = new_i;
                cj[k] = new_j;
            }
            debug_assert!(cj[i].is_zero(), "column reduction left a non-zero entry");
        }
        diagonal.push(cols[i][i].abs());
    }
    Ok(diagonal)
}
