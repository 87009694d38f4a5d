use nalgebra::DMatrix;
use num_traits::Float;

use crate::similarity::SimilarityTriple;

/// Square sparse matrix in compressed-by-column storage.
///
/// Built by scanning runs of equal `row` index in a row-sorted triple list:
/// triple `(i, j, v)` lands in column `i`, row `j`. This mirrors the layout
/// the truncated-SVD step consumes and is why [`Tversky::triples`] returns a
/// sorted list.
///
/// [`Tversky::triples`]: crate::Tversky::triples
#[derive(Debug, Clone)]
pub struct SparseColMat<F> {
    n: usize,
    col_ptr: Vec<usize>,
    row_ind: Vec<usize>,
    values: Vec<F>,
}

impl<F> SparseColMat<F>
where
    F: Float,
{
    /// Build from `n` items and a triple list sorted ascending by `row`.
    ///
    /// Panics if the list is unsorted or references an index `>= n`; both are
    /// broken invariants of the similarity builder.
    pub fn from_triples(n: usize, triples: &[SimilarityTriple<F>]) -> Self {
        let mut col_ptr = Vec::with_capacity(n + 1);
        let mut row_ind = Vec::with_capacity(triples.len());
        let mut values = Vec::with_capacity(triples.len());

        let mut next = 0;
        for i in 0..n {
            col_ptr.push(next);
            while next < triples.len() && triples[next].row == i {
                assert!(triples[next].col < n, "triple column index out of range");
                row_ind.push(triples[next].col);
                values.push(triples[next].value);
                next += 1;
            }
        }
        col_ptr.push(next);
        assert_eq!(next, triples.len(), "triple list not sorted by row");

        Self {
            n,
            col_ptr,
            row_ind,
            values,
        }
    }

    /// Matrix dimension.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Densify for the SVD solver. The solve always runs in f64.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut out = DMatrix::<f64>::zeros(self.n, self.n);
        for col in 0..self.n {
            for idx in self.col_ptr[col]..self.col_ptr[col + 1] {
                out[(self.row_ind[idx], col)] = self.values[idx].to_f64().unwrap();
            }
        }
        out
    }
}
