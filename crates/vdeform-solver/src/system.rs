//! Quadratic minimization with a subset of variables held fixed.
//!
//! Minimizes `½ xᵀ Q x - xᵀ b` over the free rows of `x` while the fixed
//! rows take prescribed values. The free block `Q_ff` is factored once with
//! a sparse Cholesky decomposition and reused for every right-hand side.

use nalgebra::DMatrix;
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use tracing::debug;

use crate::{Result, SolverError};

#[derive(Debug, Clone, Copy)]
enum Slot {
    Free(usize),
    Fixed(usize),
}

/// A symmetric positive semi-definite system split into free and fixed
/// variables, with the free block factored.
pub struct ConstrainedSystem {
    slots: Vec<Slot>,
    fixed: Vec<usize>,
    free: Vec<usize>,
    coupling: CscMatrix<f64>,
    cholesky: Option<CscCholesky<f64>>,
}

impl std::fmt::Debug for ConstrainedSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstrainedSystem")
            .field("variables", &self.slots.len())
            .field("fixed", &self.fixed.len())
            .field("free", &self.free.len())
            .finish()
    }
}

impl ConstrainedSystem {
    /// Split `q` by the `fixed` variable list and factor the free block.
    ///
    /// Fixed values passed to [`solve`](Self::solve) are matched to `fixed`
    /// by position. `fixed` must be non-empty, in range and free of
    /// duplicates.
    pub fn factor(q: &CscMatrix<f64>, fixed: &[usize]) -> Result<Self> {
        let n = q.nrows();
        if fixed.is_empty() {
            return Err(SolverError::NoConstraints);
        }

        let mut slots: Vec<Option<Slot>> = vec![None; n];
        for (c, &v) in fixed.iter().enumerate() {
            if v >= n {
                return Err(SolverError::HandleOutOfBounds {
                    index: v,
                    vertex_count: n,
                });
            }
            if slots[v].is_some() {
                return Err(SolverError::DuplicateHandle(v));
            }
            slots[v] = Some(Slot::Fixed(c));
        }
        let mut free = Vec::with_capacity(n - fixed.len());
        let slots: Vec<Slot> = slots
            .into_iter()
            .enumerate()
            .map(|(v, slot)| {
                slot.unwrap_or_else(|| {
                    free.push(v);
                    Slot::Free(free.len() - 1)
                })
            })
            .collect();

        let nf = free.len();
        let mut q_ff = CooMatrix::new(nf, nf);
        let mut q_fc = CooMatrix::new(nf, fixed.len());
        for (i, j, &v) in q.triplet_iter() {
            if let Slot::Free(fi) = slots[i] {
                match slots[j] {
                    Slot::Free(fj) => q_ff.push(fi, fj, v),
                    Slot::Fixed(cj) => q_fc.push(fi, cj, v),
                }
            }
        }

        let cholesky = if nf == 0 {
            None
        } else {
            let block = CscMatrix::from(&q_ff);
            let chol = CscCholesky::factor(&block).map_err(|e| SolverError::Factorization {
                free: nf,
                reason: format!("{e:?}"),
            })?;
            Some(chol)
        };
        debug!(variables = n, fixed = fixed.len(), free = nf, "factored constrained system");

        Ok(Self {
            slots,
            fixed: fixed.to_vec(),
            free,
            coupling: CscMatrix::from(&q_fc),
            cholesky,
        })
    }

    /// Fixed variables, in the order their values are supplied.
    pub fn fixed(&self) -> &[usize] {
        &self.fixed
    }

    /// Free variables, ascending.
    pub fn free(&self) -> &[usize] {
        &self.free
    }

    /// Solve for all variables.
    ///
    /// `fixed_values` has one row per fixed variable; `linear` (if given) is
    /// the full `n × k` linear term `b`. Fixed rows of the result hold
    /// `fixed_values` exactly.
    pub fn solve(
        &self,
        fixed_values: &DMatrix<f64>,
        linear: Option<&DMatrix<f64>>,
    ) -> Result<DMatrix<f64>> {
        if fixed_values.nrows() != self.fixed.len() {
            return Err(SolverError::TargetCountMismatch {
                expected: self.fixed.len(),
                actual: fixed_values.nrows(),
            });
        }
        let k = fixed_values.ncols();
        let n = self.slots.len();

        let mut x = DMatrix::zeros(n, k);
        for (c, &v) in self.fixed.iter().enumerate() {
            x.row_mut(v).copy_from(&fixed_values.row(c));
        }

        if let Some(chol) = &self.cholesky {
            let mut rhs: DMatrix<f64> = -(&self.coupling * fixed_values);
            if let Some(b) = linear {
                for (fi, &v) in self.free.iter().enumerate() {
                    let mut row = rhs.row_mut(fi);
                    row += b.row(v);
                }
            }
            let x_free = chol.solve(&rhs);
            for (fi, &v) in self.free.iter().enumerate() {
                x.row_mut(v).copy_from(&x_free.row(fi));
            }
        }

        if let Some(bad) = (0..n).find(|&i| !x.row(i).iter().all(|c| c.is_finite())) {
            return Err(SolverError::NonFiniteSolution(bad));
        }
        Ok(x)
    }
}
