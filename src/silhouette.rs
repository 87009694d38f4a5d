//! Cluster quality scoring.
//!
//! Crisp partitions are scored with the classic silhouette coefficient;
//! fuzzy results reuse the crisp per-item values, weighted by how decisively
//! each item prefers its best cluster over its runner-up.

use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis};
use num_traits::Float;

use crate::model::TopPair;

/// Mean distance from every item to every cluster.
///
/// The caller supplies the pairwise distance as a closure so one routine
/// serves both the Tversky-complement and squared-Euclidean paths. A member's
/// distance to its own cluster includes its zero self-distance and divides by
/// the full cluster size. Empty clusters get an infinite column so they can
/// never win the nearest-neighbor search. With `skip_unclustered`, rows of
/// items outside every cluster are left at zero instead of computed.
pub fn mean_cluster_distances<F, D>(
    n_items: usize,
    partition: &[Vec<usize>],
    dist: D,
    skip_unclustered: bool,
) -> Array2<F>
where
    F: Float + Send + Sync,
    D: Fn(usize, usize) -> F + Sync,
{
    let mut clustered = vec![false; n_items];
    for cluster in partition {
        for &i in cluster {
            clustered[i] = true;
        }
    }

    let mut out = Array2::zeros((n_items, partition.len()));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            if skip_unclustered && !clustered[i] {
                return;
            }
            for (c, cluster) in partition.iter().enumerate() {
                row[c] = if cluster.is_empty() {
                    F::infinity()
                } else {
                    let total = cluster.iter().fold(F::zero(), |acc, &j| acc + dist(i, j));
                    total / F::from(cluster.len()).unwrap()
                };
            }
        });
    out
}

/// Silhouette score of a crisp partition.
///
/// Returns the mean silhouette together with the per-item values (indexed by
/// item, zero for items that were not scored). For each member of a cluster
/// with at least two members, `a` is its mean distance to its own cluster and
/// `b` the smallest mean distance to any other non-empty cluster;
/// `s = (b - a) / max(a, b)`. Singleton members and items with no other
/// cluster to compare against stay at zero and are left out of the mean, so
/// a partition with nothing scorable comes back as 0.
pub fn crisp_silhouette<F>(partition: &[Vec<usize>], dists: &Array2<F>) -> (F, Vec<F>)
where
    F: Float,
{
    let n_items = dists.nrows();
    let mut sils = vec![F::zero(); n_items];
    let mut total = F::zero();
    let mut counted = 0usize;

    for (c, cluster) in partition.iter().enumerate() {
        if cluster.len() <= 1 {
            continue;
        }
        for &i in cluster {
            let a = dists[(i, c)];
            let mut b = F::infinity();
            for c_other in 0..partition.len() {
                if c_other == c {
                    continue;
                }
                let d = dists[(i, c_other)];
                if d < b {
                    b = d;
                }
            }
            if !b.is_finite() {
                continue;
            }
            let denom = a.max(b);
            let s = if denom == F::zero() {
                F::zero()
            } else {
                (b - a) / denom
            };
            sils[i] = s;
            total = total + s;
            counted += 1;
        }
    }

    let score = if counted == 0 {
        F::zero()
    } else {
        total / F::from(counted).unwrap()
    };
    (score, sils)
}

/// Fuzzy silhouette score (Campello and Hruschka).
///
/// Weighted mean of the per-item crisp silhouettes where each item's weight
/// is the gap between its largest and second-largest membership. Decisively
/// assigned items dominate; items torn between two clusters barely count.
/// A zero total weight yields 0.
pub fn fuzzy_silhouette<F>(silhouettes: &[F], top_pairs: &[TopPair<F>]) -> F
where
    F: Float,
{
    let mut weighted = F::zero();
    let mut weight = F::zero();
    for (s, tp) in silhouettes.iter().zip(top_pairs.iter()) {
        let w = tp.first - tp.second;
        weighted = weighted + w * *s;
        weight = weight + w;
    }
    if weight == F::zero() {
        F::zero()
    } else {
        weighted / weight
    }
}
