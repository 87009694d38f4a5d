//! Lloyd-style k-means over dense fingerprint vectors.
//!
//! Runs several independently seeded restarts and keeps the partition with
//! the best crisp silhouette. A restart converges when the partition itself
//! stops changing, compared in a canonical order so centroid drift below
//! assignment resolution cannot keep it looping.

use ndarray::{Array1, Array2, ArrayView1};
use num_traits::Float;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};
use crate::model::{Cluster, ClusterMember};
use crate::silhouette::crisp_silhouette;

const MAX_ITERATIONS: usize = 1000;

pub(crate) fn squared_distance<F>(a: ArrayView1<F>, b: ArrayView1<F>) -> F
where
    F: Float,
{
    a.iter().zip(b.iter()).fold(F::zero(), |acc, (x, y)| {
        let d = *x - *y;
        acc + d * d
    })
}

/// K-means configuration. Restarts default to 10 with a fixed seed of 0;
/// each restart derives its own generator from `seed + restart index`.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    restarts: usize,
    seed: u64,
}

/// Best partition over all restarts, clusters sorted largest first.
#[derive(Debug, Clone)]
pub struct KMeansResult<F> {
    pub clusters: Vec<Cluster<F>>,
    pub score: F,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            restarts: 10,
            seed: 0,
        }
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cluster the rows of `data`.
    ///
    /// Members carry their negative squared distance to the cluster centroid
    /// as contribution, so sorting descending puts the most central items
    /// first. Empty clusters are dropped, which is why a result can hold
    /// fewer than `k` clusters.
    pub fn fit<F>(&self, data: &Array2<F>) -> Result<KMeansResult<F>>
    where
        F: Float + Send + Sync,
    {
        let n = data.nrows();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.restarts == 0 {
            return Err(Error::InvalidParameter {
                name: "restarts",
                message: "must be at least 1",
            });
        }
        if self.k > n {
            return Err(Error::InsufficientData {
                requested: self.k,
                usable: n,
            });
        }

        let mut best: Option<KMeansResult<F>> = None;
        for t in 0..self.restarts {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(t as u64));
            let picks = rand::seq::index::sample(&mut rng, n, self.k);
            let mut centroids: Vec<Array1<F>> =
                picks.iter().map(|i| data.row(i).to_owned()).collect();

            let mut partition: Vec<Vec<usize>> = Vec::new();
            for _ in 0..MAX_ITERATIONS {
                let mut next = vec![Vec::new(); centroids.len()];
                for i in 0..n {
                    let mut nearest = 0;
                    let mut nearest_d = squared_distance(data.row(i), centroids[0].view());
                    for (c, centroid) in centroids.iter().enumerate().skip(1) {
                        let d = squared_distance(data.row(i), centroid.view());
                        if d < nearest_d {
                            nearest_d = d;
                            nearest = c;
                        }
                    }
                    next[nearest].push(i);
                }
                // canonical form: members are pushed in ascending item order,
                // clusters ordered by their first member, empties dropped
                next.retain(|cluster| !cluster.is_empty());
                next.sort_by_key(|cluster| cluster[0]);
                if next == partition {
                    break;
                }
                centroids = next
                    .iter()
                    .map(|cluster| {
                        let mut centroid = Array1::<F>::zeros(data.ncols());
                        for &i in cluster {
                            centroid = centroid + data.row(i);
                        }
                        centroid.mapv_into(|v| v / F::from(cluster.len()).unwrap())
                    })
                    .collect();
                partition = next;
            }

            // silhouette distances are to the surviving centroids, not
            // between items
            let mut dists = Array2::<F>::zeros((n, partition.len()));
            for i in 0..n {
                for (c, centroid) in centroids.iter().enumerate() {
                    dists[(i, c)] = squared_distance(data.row(i), centroid.view());
                }
            }
            let (score, sils) = crisp_silhouette(&partition, &dists);
            if best.as_ref().map_or(true, |b| score > b.score) {
                let threshold = F::from(-1.0).unwrap();
                let mut clusters: Vec<Cluster<F>> = partition
                    .iter()
                    .zip(centroids.iter())
                    .map(|(members, centroid)| {
                        let mut cluster = Cluster::new(F::zero(), threshold);
                        for &i in members {
                            let d = squared_distance(data.row(i), centroid.view());
                            cluster.add_member(ClusterMember::new(i, -d, sils[i]), false);
                        }
                        cluster.sort_members();
                        cluster
                    })
                    .collect();
                clusters.sort_by(|a, b| b.len().cmp(&a.len()));
                best = Some(KMeansResult { clusters, score });
            }
        }

        Ok(best.unwrap())
    }
}

#[cfg(test)]
mod test {
    use ndarray::arr2;

    use super::{squared_distance, KMeans};
    use crate::error::Error;

    fn two_groups() -> ndarray::Array2<f64> {
        arr2(&[[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]])
    }

    #[test]
    fn squared_distance_basic() {
        let data = two_groups();
        assert_eq!(squared_distance(data.row(0), data.row(1)), 1.0);
        assert_eq!(squared_distance(data.row(0), data.row(2)), 200.0);
    }

    #[test]
    fn separates_two_obvious_groups() {
        let result = KMeans::new(2).fit(&two_groups()).unwrap();
        assert_eq!(result.clusters.len(), 2);
        let mut groups: Vec<Vec<usize>> = result
            .clusters
            .iter()
            .map(|c| {
                let mut items: Vec<usize> = c.members().iter().map(|m| m.item()).collect();
                items.sort_unstable();
                items
            })
            .collect();
        groups.sort();
        assert_eq!(groups, vec![vec![0, 1], vec![2, 3]]);
        assert!(result.score > 0.9);
        for cluster in &result.clusters {
            for member in cluster.members() {
                assert!(member.contribution() <= 0.0);
                assert!(member.silhouette() > 0.9);
            }
        }
    }

    #[test]
    fn converged_error_no_worse_than_seeded_assignment() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        // each assignment and centroid update is non-increasing in the
        // within-cluster squared error, so the converged error can never
        // exceed that of the freshly seeded centroids
        let data = two_groups();
        for seed in 0..8u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let picks = rand::seq::index::sample(&mut rng, data.nrows(), 2);
            let centroids: Vec<ndarray::Array1<f64>> =
                picks.iter().map(|i| data.row(i).to_owned()).collect();
            let seeded_sse: f64 = (0..data.nrows())
                .map(|i| {
                    centroids
                        .iter()
                        .map(|c| squared_distance(data.row(i), c.view()))
                        .fold(f64::INFINITY, f64::min)
                })
                .sum();

            let result = KMeans::new(2)
                .with_restarts(1)
                .with_seed(seed)
                .fit(&data)
                .unwrap();
            // member contributions are negative squared centroid distances
            let converged_sse: f64 = -result
                .clusters
                .iter()
                .flat_map(|c| c.members())
                .map(|m| m.contribution())
                .sum::<f64>();
            assert!(converged_sse <= seeded_sse + 1e-9);
        }
    }

    #[test]
    fn same_seed_same_result() {
        let data = two_groups();
        let a = KMeans::new(2).with_seed(7).fit(&data).unwrap();
        let b = KMeans::new(2).with_seed(7).fit(&data).unwrap();
        assert_eq!(a.score, b.score);
        for (ca, cb) in a.clusters.iter().zip(b.clusters.iter()) {
            let ia: Vec<usize> = ca.members().iter().map(|m| m.item()).collect();
            let ib: Vec<usize> = cb.members().iter().map(|m| m.item()).collect();
            assert_eq!(ia, ib);
        }
    }

    #[test]
    fn input_validation() {
        let data = two_groups();
        assert_eq!(
            KMeans::new(0).fit(&data).unwrap_err(),
            Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            }
        );
        assert_eq!(
            KMeans::new(5).fit(&data).unwrap_err(),
            Error::InsufficientData {
                requested: 5,
                usable: 4,
            }
        );
        let empty = ndarray::Array2::<f64>::zeros((0, 2));
        assert_eq!(KMeans::new(1).fit(&empty).unwrap_err(), Error::EmptyInput);
    }
}
