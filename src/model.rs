use ndarray::{Array2, ArrayView1};
use num_traits::Float;

/// One item's place in a cluster.
///
/// `contribution` is the member's weight within the cluster: the singular
/// vector coefficient magnitude for spectral clusters, the negative squared
/// centroid distance for k-means and the membership coefficient for fuzzy
/// k-means. Both scalars are set once at construction and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterMember<F> {
    item: usize,
    contribution: F,
    silhouette: F,
}

impl<F> ClusterMember<F>
where
    F: Float,
{
    pub fn new(item: usize, contribution: F, silhouette: F) -> Self {
        Self {
            item,
            contribution,
            silhouette,
        }
    }

    /// Index of the item this member refers to.
    pub fn item(&self) -> usize {
        self.item
    }

    pub fn contribution(&self) -> F {
        self.contribution
    }

    pub fn silhouette(&self) -> F {
        self.silhouette
    }
}

/// An ordered list of members with a cluster strength and the membership
/// threshold it was built with.
///
/// Members stay sorted descending by contribution; bulk insertion can defer
/// the sort with `add_member(.., false)` followed by one `sort_members()`.
#[derive(Debug, Clone)]
pub struct Cluster<F> {
    strength: F,
    threshold: F,
    members: Vec<ClusterMember<F>>,
}

impl<F> Cluster<F>
where
    F: Float,
{
    /// Empty cluster. `strength` is the singular value for spectral clusters
    /// and an unused zero placeholder for the k-means family.
    pub fn new(strength: F, threshold: F) -> Self {
        Self {
            strength,
            threshold,
            members: Vec::new(),
        }
    }

    /// Build an overlapping spectral cluster from one singular vector's
    /// coefficient magnitudes: every item whose coefficient beats the
    /// threshold joins, carrying its crisp silhouette score.
    pub fn from_coefficients(
        strength: F,
        threshold: F,
        coefficients: ArrayView1<'_, F>,
        silhouettes: &[F],
    ) -> Self {
        let mut cluster = Self::new(strength, threshold);
        for (item, &c) in coefficients.iter().enumerate() {
            cluster.add_member(ClusterMember::new(item, c, silhouettes[item]), false);
        }
        cluster.sort_members();
        cluster
    }

    /// Add a member if its contribution magnitude beats the threshold,
    /// re-sorting unless deferred.
    pub fn add_member(&mut self, member: ClusterMember<F>, resort: bool) {
        if member.contribution().abs() > self.threshold {
            self.members.push(member);
            if resort {
                self.sort_members();
            }
        }
    }

    /// Sort members into descending order of contribution.
    pub fn sort_members(&mut self) {
        self.members
            .sort_by(|a, b| b.contribution.partial_cmp(&a.contribution).unwrap());
    }

    pub fn strength(&self) -> F {
        self.strength
    }

    pub fn threshold(&self) -> F {
        self.threshold
    }

    pub fn members(&self) -> &[ClusterMember<F>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Per-item record of its two largest cluster coefficients.
///
/// `first >= second` always; `second_cluster` is `None` when only one
/// cluster exists (`second` is then 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopPair<F> {
    pub first: F,
    pub first_cluster: usize,
    pub second: F,
    pub second_cluster: Option<usize>,
}

/// Scan an items-by-clusters coefficient matrix for each item's top pair.
///
/// Callers pass coefficient magnitudes where sign is meaningless (spectral)
/// and raw memberships where it is not (fuzzy). Tie-break is deliberate and
/// load-bearing: from the third cluster on, a coefficient `>=` the current
/// first takes over the first slot (demoting it to second), while only a
/// strictly greater one replaces the second slot. An exact tie therefore
/// promotes the later cluster index.
pub fn top_pairs<F>(coefficients: &Array2<F>) -> Vec<TopPair<F>>
where
    F: Float,
{
    let k = coefficients.ncols();
    assert!(k >= 1, "coefficient matrix must have at least one cluster");

    coefficients
        .rows()
        .into_iter()
        .map(|row| {
            if k == 1 {
                return TopPair {
                    first: row[0],
                    first_cluster: 0,
                    second: F::zero(),
                    second_cluster: None,
                };
            }
            let mut tp = if row[0] > row[1] {
                TopPair {
                    first: row[0],
                    first_cluster: 0,
                    second: row[1],
                    second_cluster: Some(1),
                }
            } else {
                TopPair {
                    first: row[1],
                    first_cluster: 1,
                    second: row[0],
                    second_cluster: Some(0),
                }
            };
            for j in 2..k {
                if row[j] >= tp.first {
                    tp.second = tp.first;
                    tp.second_cluster = Some(tp.first_cluster);
                    tp.first = row[j];
                    tp.first_cluster = j;
                } else if row[j] > tp.second {
                    tp.second = row[j];
                    tp.second_cluster = Some(j);
                }
            }
            tp
        })
        .collect()
}

/// Non-overlapping partition from top pairs: each item joins the cluster of
/// its largest coefficient, if that coefficient beats the threshold.
pub fn crisp_partition<F>(
    top_pairs: &[TopPair<F>],
    threshold: F,
    n_clusters: usize,
) -> Vec<Vec<usize>>
where
    F: Float,
{
    let mut partition = vec![Vec::new(); n_clusters];
    for (item, tp) in top_pairs.iter().enumerate() {
        if tp.first > threshold {
            partition[tp.first_cluster].push(item);
        }
    }
    partition
}
