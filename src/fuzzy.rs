//! Fuzzy c-means (Bezdek) over dense fingerprint vectors.
//!
//! Items receive graded memberships in every cluster instead of a single
//! assignment. Restarts track the objective `J = sum u_ij^m * d_ij^2`; a run
//! landing within 1e-3 of the best seen counts as a repeat of the same
//! optimum, and three repeats end the search early.

use ndarray::{Array1, Array2};
use num_traits::Float;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};
use crate::kmeans::squared_distance;
use crate::model::{crisp_partition, top_pairs, Cluster, ClusterMember};
use crate::silhouette::{crisp_silhouette, fuzzy_silhouette, mean_cluster_distances};

const MAX_ITERATIONS: usize = 100_000;
const CONVERGENCE: f64 = 1e-6;
const OBJECTIVE_TIE: f64 = 1e-3;

/// Fuzzy k-means configuration.
///
/// `fuzziness` is Bezdek's `m`: values near 1 give nearly crisp memberships,
/// larger values blur them. The membership threshold decides which items are
/// listed as members of each output cluster and which count toward the crisp
/// partition behind the fuzzy silhouette.
#[derive(Debug, Clone)]
pub struct FuzzyKMeans {
    k: usize,
    restarts: usize,
    fuzziness: f64,
    threshold: f64,
    seed: u64,
}

/// Clusters of the best restart, one per requested cluster, in column order.
/// Unlike k-means, clusters that end up empty are kept.
#[derive(Debug, Clone)]
pub struct FuzzyKMeansResult<F> {
    pub clusters: Vec<Cluster<F>>,
    pub score: F,
}

/// Restart bookkeeping over the fuzzy objective.
///
/// A near-tie on the best objective captures the run and counts toward three
/// repeats, taken as convergence to the global optimum. The tie check and
/// the improvement check are independent: a run that improves by less than
/// the tie window still updates the best objective and restarts the repeat
/// count, so slow downhill drift never triggers the early stop.
struct RestartTracker {
    best: f64,
    repeats: usize,
}

impl RestartTracker {
    fn new() -> Self {
        Self {
            best: f64::INFINITY,
            repeats: 0,
        }
    }

    /// Returns (keep this restart's matrix, stop searching).
    fn record(&mut self, objective: f64) -> (bool, bool) {
        let tie = (objective - self.best).abs() < OBJECTIVE_TIE;
        if tie {
            self.repeats += 1;
        }
        let improved = objective < self.best;
        if improved {
            self.best = objective;
            self.repeats = 1;
        }
        (tie || improved, self.repeats >= 3)
    }
}

impl FuzzyKMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            restarts: 10,
            fuzziness: 2.0,
            threshold: 0.01,
            seed: 0,
        }
    }

    pub fn with_fuzziness(mut self, fuzziness: f64) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    pub fn with_membership_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
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
    /// Member contributions are the membership coefficients, so every item
    /// appears in every cluster whose membership beats the threshold. The
    /// score is the fuzzy silhouette of the best restart.
    pub fn fit<F>(&self, data: &Array2<F>) -> Result<FuzzyKMeansResult<F>>
    where
        F: Float + Send + Sync,
    {
        let n = data.nrows();
        let k = self.k;
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if k == 0 {
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
        if self.fuzziness <= 1.0 {
            return Err(Error::InvalidParameter {
                name: "fuzziness",
                message: "must be greater than 1",
            });
        }
        if k > n {
            return Err(Error::InsufficientData {
                requested: k,
                usable: n,
            });
        }

        let m = F::from(self.fuzziness).unwrap();
        let exponent = F::from(1.0 / (self.fuzziness - 1.0)).unwrap();
        let convergence = F::from(CONVERGENCE).unwrap();

        let mut best: Option<Array2<F>> = None;
        let mut tracker = RestartTracker::new();

        for t in 0..self.restarts {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(t as u64));
            let mut u = Array2::<F>::zeros((n, k));
            for i in 0..n {
                let mut total = F::zero();
                for j in 0..k {
                    let v = F::from(rng.gen::<f64>()).unwrap();
                    u[(i, j)] = v;
                    total = total + v;
                }
                for j in 0..k {
                    u[(i, j)] = u[(i, j)] / total;
                }
            }

            let mut centroids = vec![Array1::<F>::zeros(data.ncols()); k];
            let mut dists = Array2::<F>::zeros((n, k));
            for _ in 0..MAX_ITERATIONS {
                for (j, centroid) in centroids.iter_mut().enumerate() {
                    let mut acc = Array1::<F>::zeros(data.ncols());
                    let mut weight = F::zero();
                    for i in 0..n {
                        let w = u[(i, j)].powf(m);
                        weight = weight + w;
                        for (a, x) in acc.iter_mut().zip(data.row(i).iter()) {
                            *a = *a + w * *x;
                        }
                    }
                    // a cluster with no weight at all keeps its old centroid
                    if weight > F::zero() {
                        *centroid = acc.mapv_into(|v| v / weight);
                    }
                }

                for i in 0..n {
                    for j in 0..k {
                        dists[(i, j)] = squared_distance(data.row(i), centroids[j].view());
                    }
                }

                let mut next = Array2::<F>::zeros((n, k));
                for i in 0..n {
                    let coincident = (0..k).filter(|&j| dists[(i, j)] == F::zero()).count();
                    if coincident > 0 {
                        // item sits on a centroid; split membership over the
                        // coincident centroids instead of dividing by zero
                        let share = F::one() / F::from(coincident).unwrap();
                        for j in 0..k {
                            next[(i, j)] = if dists[(i, j)] == F::zero() {
                                share
                            } else {
                                F::zero()
                            };
                        }
                        continue;
                    }
                    for j in 0..k {
                        let mut total = F::zero();
                        for l in 0..k {
                            total = total + (dists[(i, j)] / dists[(i, l)]).powf(exponent);
                        }
                        next[(i, j)] = F::one() / total;
                    }
                }

                // total squared coefficient change over the whole matrix
                let mut delta = F::zero();
                for (a, b) in u.iter().zip(next.iter()) {
                    let change = *a - *b;
                    delta = delta + change * change;
                }
                // keep the matrix the centroids and distances were built from
                if delta < convergence {
                    break;
                }
                u = next;
            }

            let mut objective = 0f64;
            for i in 0..n {
                for j in 0..k {
                    objective += u[(i, j)].to_f64().unwrap().powf(self.fuzziness)
                        * dists[(i, j)].to_f64().unwrap();
                }
            }

            let (keep, stop) = tracker.record(objective);
            if keep {
                best = Some(u);
            }
            if stop {
                break;
            }
        }

        let u = best.unwrap();
        let threshold = F::from(self.threshold).unwrap();
        let clusters = (0..k)
            .map(|j| {
                let mut cluster = Cluster::new(F::zero(), threshold);
                for i in 0..n {
                    cluster.add_member(ClusterMember::new(i, u[(i, j)], F::zero()), false);
                }
                cluster.sort_members();
                cluster
            })
            .collect();

        let tps = top_pairs(&u);
        let partition = crisp_partition(&tps, threshold, k);
        let dists = mean_cluster_distances(
            n,
            &partition,
            |i, j| squared_distance(data.row(i), data.row(j)),
            false,
        );
        let (_, sils) = crisp_silhouette(&partition, &dists);
        let score = fuzzy_silhouette(&sils, &tps);

        Ok(FuzzyKMeansResult { clusters, score })
    }
}
