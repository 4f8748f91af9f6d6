//! Bundled per-face Hilbert basis solver.
//!
//! The cone spanned by the generators is triangulated by placing (in the coordinates of a pivot
//! set onto which its linear span projects isomorphically). Every Hilbert basis element is a
//! generator or a lattice point of the half-open fundamental parallelepiped of some simplex; those
//! points are enumerated coset by coset using a triangular basis of each simplex lattice. The
//! candidates are finally reduced: `x` goes iff `x - y` lies in the cone for another candidate `y`.

use std::collections::BTreeSet;

use ahash::AHashMap;
use quadrille_core::{Integer, Sign, Vector};
use tracing::trace;

use super::FaceSolver;
use crate::linalg::{pivot_columns, triangular_lattice_diagonal, SquareMatrix};
use crate::FundamentError as Error;

#[derive(Copy, Clone, Debug, Default)]
pub struct SimplicialSolver;

impl FaceSolver for SimplicialSolver {
    fn name(&self) -> &'static str {
        "simplicial"
    }

    fn hilbert_basis(
        &self,
        _face: &[usize],
        generators: &[Vector<Integer>],
    ) -> Result<Vec<Vector<Integer>>, Error> {
        simplicial_hilbert_basis(generators)
    }
}

/// A full-dimensional simplicial cone of the triangulation.
struct Cell {
    /// Indices into the generator list.
    vertices: Vec<usize>,
    /// `|det|` of the projected vertex matrix.
    det: Integer,
    /// `det * V^-1` for the projected vertex matrix `V`.
    adjugate: SquareMatrix,
}

struct Triangulated<'a> {
    generators: &'a [Vector<Integer>],
    pivots: Vec<usize>,
    projected: Vec<Vec<Integer>>,
    cells: Vec<Cell>,
}

impl<'a> Triangulated<'a> {
    fn project(&self, x: &Vector<Integer>) -> Vec<Integer> {
        self.pivots.iter().map(|&c| x[c].clone()).collect()
    }

    /// `sum_j coeffs[j] * g_{vertices[j]}` in full coordinates.
    fn lift(&self, cell: &Cell, coeffs: &[Integer]) -> Result<Vector<Integer>, Error> {
        let dim = self.generators[0].len();
        let mut out = Vector::zeros(dim);
        for (&v, c) in cell.vertices.iter().zip(coeffs) {
            if c.is_zero() {
                continue;
            }
            let mut term = self.generators[v].clone();
            term.scale(c);
            out.add_assign(&term)?;
        }
        Ok(out)
    }

    /// Whether the lattice vector `z` lies in the cone.
    fn contains(&self, z: &Vector<Integer>) -> Result<bool, Error> {
        let y = self.project(z);
        let mut scaled = z.clone();
        for cell in &self.cells {
            let coeffs = cell.adjugate.mul_vec(&y);
            if coeffs.iter().any(Integer::is_negative) {
                continue;
            }
            scaled.clone_from(z);
            scaled.scale(&cell.det);
            if self.lift(cell, &coeffs)? == scaled {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Non-zero lattice points of the half-open parallelepiped spanned by the cell.
    fn parallelepiped_points(
        &self,
        cell: &Cell,
        out: &mut BTreeSet<Vector<Integer>>,
    ) -> Result<(), Error> {
        if cell.det.is_one() {
            return Ok(());
        }
        let columns: Vec<Vec<Integer>> = cell
            .vertices
            .iter()
            .map(|&v| self.projected[v].clone())
            .collect();
        let diagonal = triangular_lattice_diagonal(&columns)?;
        let d = diagonal.len();
        let mut y = vec![Integer::zero(); d];
        loop {
            // Odometer step over 0 <= y_i < diagonal_i; the all-zero start is skipped.
            let mut i = 0;
            while i < d {
                y[i] += &Integer::one();
                if y[i] < diagonal[i] {
                    break;
                }
                y[i] = Integer::zero();
                i += 1;
            }
            if i == d {
                return Ok(());
            }

            let mut coeffs = cell.adjugate.mul_vec(&y);
            for c in &mut coeffs {
                *c = c.div_rem_floor(&cell.det)?.1;
            }
            let x = self.lift(cell, &coeffs)?;
            if x.is_zero() {
                continue;
            }
            // Off-lattice cosets of the projection do not lift to integer points.
            let Ok(point) = x
                .iter()
                .map(|e| e.div_exact(&cell.det))
                .collect::<Result<Vec<_>, _>>()
            else {
                continue;
            };
            out.insert(Vector::from_elements(point));
        }
    }
}

fn orientation(projected: &[Vec<Integer>], facet: &[usize], apex: usize) -> Result<Sign, Error> {
    let mut columns: Vec<&[Integer]> = facet.iter().map(|&v| projected[v].as_slice()).collect();
    columns.push(projected[apex].as_slice());
    Ok(SquareMatrix::from_columns(&columns)?.determinant()?.sign())
}

/// Facets lying in exactly one simplex, each with the vertex of that simplex opposite to it.
fn boundary_facets(simplices: &[Vec<usize>]) -> Vec<(Vec<usize>, usize)> {
    let mut index: AHashMap<Vec<usize>, usize> = AHashMap::new();
    let mut facets: Vec<(Vec<usize>, usize, usize)> = Vec::new();
    for simplex in simplices {
        for skip in 0..simplex.len() {
            let facet: Vec<usize> = simplex
                .iter()
                .enumerate()
                .filter_map(|(k, &v)| (k != skip).then_some(v))
                .collect();
            match index.get(&facet) {
                Some(&at) => facets[at].2 += 1,
                None => {
                    index.insert(facet.clone(), facets.len());
                    facets.push((facet, simplex[skip], 1));
                }
            }
        }
    }
    facets
        .into_iter()
        .filter_map(|(facet, opposite, count)| (count == 1).then_some((facet, opposite)))
        .collect()
}

/// Placing triangulation of the cone over `projected` (full rank `d`).
fn placing_triangulation(projected: &[Vec<Integer>], d: usize) -> Result<Vec<Vec<usize>>, Error> {
    let mut start: Vec<usize> = Vec::with_capacity(d);
    for i in 0..projected.len() {
        if start.len() == d {
            break;
        }
        let mut trial: Vec<Vector<Integer>> = start
            .iter()
            .map(|&v| Vector::from_elements(projected[v].clone()))
            .collect();
        trial.push(Vector::from_elements(projected[i].clone()));
        if pivot_columns(&trial)?.len() == trial.len() {
            start.push(i);
        }
    }
    if start.len() < d {
        return Err(Error::invalid("generators do not span the projected space"));
    }

    let mut simplices = vec![start.clone()];
    for g in 0..projected.len() {
        if start.contains(&g) {
            continue;
        }
        let mut added = Vec::new();
        for (facet, opposite) in boundary_facets(&simplices) {
            let side = orientation(projected, &facet, g)?;
            if side == Sign::Zero {
                continue;
            }
            if side == orientation(projected, &facet, opposite)?.negate() {
                let mut simplex = facet;
                simplex.push(g);
                simplex.sort_unstable();
                added.push(simplex);
            }
        }
        simplices.extend(added);
    }
    Ok(simplices)
}

/// Hilbert basis of the cone spanned by non-negative `generators`, sorted.
pub fn simplicial_hilbert_basis(
    generators: &[Vector<Integer>],
) -> Result<Vec<Vector<Integer>>, Error> {
    let mut gens: Vec<Vector<Integer>> = Vec::with_capacity(generators.len());
    for g in generators {
        if !g.is_non_negative() {
            return Err(Error::invalid(format!("generator {g} has a negative entry")));
        }
        let mut g = g.clone();
        if !g.scale_down().is_zero() {
            gens.push(g);
        }
    }
    gens.sort();
    gens.dedup();
    let Some(first) = gens.first() else {
        return Ok(Vec::new());
    };
    if let Some(bad) = gens.iter().find(|g| g.len() != first.len()) {
        return Err(Error::DimensionMismatch {
            expected: first.len(),
            found: bad.len(),
        });
    }

    let pivots = pivot_columns(&gens)?;
    let d = pivots.len();
    let projected: Vec<Vec<Integer>> = gens
        .iter()
        .map(|g| pivots.iter().map(|&c| g[c].clone()).collect())
        .collect();
    let simplices = placing_triangulation(&projected, d)?;

    let mut cells = Vec::with_capacity(simplices.len());
    for vertices in simplices {
        let columns: Vec<&[Integer]> = vertices.iter().map(|&v| projected[v].as_slice()).collect();
        let Some((det, adjugate)) = SquareMatrix::from_columns(&columns)?.scaled_inverse()? else {
            return Err(Error::invalid("degenerate simplex in triangulation"));
        };
        cells.push(Cell {
            vertices,
            det,
            adjugate,
        });
    }
    let cone = Triangulated {
        generators: &gens,
        pivots,
        projected,
        cells,
    };

    let mut candidates: BTreeSet<Vector<Integer>> = gens.iter().cloned().collect();
    for cell in &cone.cells {
        cone.parallelepiped_points(cell, &mut candidates)?;
    }
    trace!(
        rank = d,
        simplices = cone.cells.len(),
        candidates = candidates.len(),
        "simplicial candidates"
    );

    let candidates: Vec<Vector<Integer>> = candidates.into_iter().collect();
    let mut basis = Vec::new();
    'outer: for x in &candidates {
        for y in &candidates {
            if y == x || !y.le_componentwise(x) {
                continue;
            }
            let diff = x.checked_sub(y)?;
            if cone.contains(&diff)? {
                continue 'outer;
            }
        }
        basis.push(x.clone());
    }
    Ok(basis)
}
