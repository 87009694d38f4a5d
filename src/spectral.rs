//! Spectral clustering by truncated SVD of the similarity matrix.
//!
//! Each retained singular vector defines one cluster: items load onto it
//! with a coefficient whose magnitude measures how strongly they belong.
//! Both the left and right singular bases are clustered; with symmetric
//! Tversky weights they agree, with asymmetric weights they give the two
//! directional readings of the same matrix.

use nalgebra::SVD;
use ndarray::Array2;
use num_traits::Float;

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crate::model::{crisp_partition, top_pairs, Cluster, ClusterMember};
use crate::silhouette::{crisp_silhouette, fuzzy_silhouette, mean_cluster_distances};
use crate::similarity::{tversky_similarity, Tversky};
use crate::sparse::SparseColMat;

// singular values this far below the largest are numeric noise
const RANK_TOLERANCE: f64 = 1e-12;

/// Spectral clustering configuration.
///
/// `rank` caps how many singular vectors (and therefore clusters) are
/// extracted; the actual count can come out lower when the similarity matrix
/// has smaller numeric rank. Overlapping mode admits every item whose
/// coefficient magnitude beats the membership threshold into each cluster,
/// instead of assigning each item to its single best cluster.
#[derive(Debug, Clone)]
pub struct SpectralClustering<F> {
    rank: usize,
    alpha: F,
    beta: F,
    gamma: F,
    sim_threshold: F,
    membership_threshold: F,
    overlapping: bool,
}

/// Clusters from both singular bases, strongest singular value first.
///
/// `rank` is the number of singular vectors actually used.
#[derive(Debug, Clone)]
pub struct SpectralResult<F> {
    pub rank: usize,
    pub u_clusters: Vec<Cluster<F>>,
    pub u_score: F,
    pub v_clusters: Vec<Cluster<F>>,
    pub v_score: F,
}

impl<F> SpectralClustering<F>
where
    F: Float + Send + Sync,
{
    /// New configuration with Tanimoto weights, Gaussian sharpening disabled
    /// and both thresholds at 0.01.
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            alpha: F::one(),
            beta: F::one(),
            gamma: F::from(-1.0).unwrap(),
            sim_threshold: F::from(0.01).unwrap(),
            membership_threshold: F::from(0.01).unwrap(),
            overlapping: false,
        }
    }

    /// Set the Tversky weights for the similarity matrix.
    pub fn with_weights(mut self, alpha: F, beta: F) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    /// Set the Gaussian sharpening parameter; values `<= -0.5` disable it.
    pub fn with_gamma(mut self, gamma: F) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the similarity threshold for the sparse matrix.
    pub fn with_similarity_threshold(mut self, threshold: F) -> Self {
        self.sim_threshold = threshold;
        self
    }

    /// Set the coefficient threshold for cluster membership.
    pub fn with_membership_threshold(mut self, threshold: F) -> Self {
        self.membership_threshold = threshold;
        self
    }

    pub fn with_overlapping(mut self, overlapping: bool) -> Self {
        self.overlapping = overlapping;
        self
    }

    /// Cluster `fingerprints`.
    ///
    /// Items without a fingerprint contribute nothing to the similarity
    /// matrix, so their coefficients stay at zero and they never join a
    /// cluster. A similarity matrix with no entries at all produces an empty
    /// result with `rank` 0.
    pub fn fit(&self, fingerprints: &[Option<Fingerprint>]) -> Result<SpectralResult<F>> {
        let n = fingerprints.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.rank == 0 {
            return Err(Error::InvalidParameter {
                name: "rank",
                message: "must be at least 1",
            });
        }
        let usable = fingerprints.iter().filter(|fp| fp.is_some()).count();
        if self.rank > usable {
            return Err(Error::InsufficientData {
                requested: self.rank,
                usable,
            });
        }

        let triples = Tversky::new(self.alpha, self.beta)
            .with_gamma(self.gamma)
            .with_threshold(self.sim_threshold)
            .triples(fingerprints);
        let dense = SparseColMat::from_triples(n, &triples).to_dense();
        let svd = SVD::new(dense, true, true);

        let sv = &svd.singular_values;
        let mut order: Vec<usize> = (0..sv.len()).collect();
        order.sort_by(|&a, &b| sv[b].partial_cmp(&sv[a]).unwrap());
        let tolerance = sv[order[0]] * RANK_TOLERANCE;
        let numeric_rank = order.iter().filter(|&&j| sv[j] > tolerance).count();
        let rank = self.rank.min(numeric_rank);
        if rank == 0 {
            return Ok(SpectralResult {
                rank: 0,
                u_clusters: Vec::new(),
                u_score: F::zero(),
                v_clusters: Vec::new(),
                v_score: F::zero(),
            });
        }

        let u = svd.u.expect("left singular vectors were requested");
        let v_t = svd.v_t.expect("right singular vectors were requested");
        let strengths: Vec<F> = order[..rank]
            .iter()
            .map(|&j| F::from(sv[j]).unwrap())
            .collect();
        let coeffs_u =
            Array2::from_shape_fn((n, rank), |(i, j)| F::from(u[(i, order[j])]).unwrap());
        let coeffs_v =
            Array2::from_shape_fn((n, rank), |(i, j)| F::from(v_t[(order[j], i)]).unwrap());

        let (u_clusters, u_score) = self.extract(&coeffs_u, &strengths, fingerprints);
        let (v_clusters, v_score) = self.extract(&coeffs_v, &strengths, fingerprints);
        Ok(SpectralResult {
            rank,
            u_clusters,
            u_score,
            v_clusters,
            v_score,
        })
    }

    /// Turn one basis of singular-vector coefficients into scored clusters.
    ///
    /// Silhouettes use the raw Tversky complement as distance so the score
    /// reflects the fingerprints themselves, not the sharpened matrix the
    /// SVD consumed. Items outside every cluster are skipped.
    fn extract(
        &self,
        coeffs: &Array2<F>,
        strengths: &[F],
        fingerprints: &[Option<Fingerprint>],
    ) -> (Vec<Cluster<F>>, F) {
        let n = coeffs.nrows();
        let abs = coeffs.mapv(|c| c.abs());
        let tps = top_pairs(&abs);
        let partition = crisp_partition(&tps, self.membership_threshold, strengths.len());

        let dist = |i: usize, j: usize| match (&fingerprints[i], &fingerprints[j]) {
            (Some(a), Some(b)) => F::one() - tversky_similarity(a, b, self.alpha, self.beta),
            _ => F::one(),
        };
        let dists = mean_cluster_distances(n, &partition, dist, true);
        let (crisp_score, sils) = crisp_silhouette(&partition, &dists);

        if self.overlapping {
            let clusters = strengths
                .iter()
                .enumerate()
                .map(|(j, &strength)| {
                    Cluster::from_coefficients(
                        strength,
                        self.membership_threshold,
                        abs.column(j),
                        &sils,
                    )
                })
                .filter(|cluster| !cluster.is_empty())
                .collect();
            (clusters, fuzzy_silhouette(&sils, &tps))
        } else {
            let mut clusters = Vec::new();
            for (j, &strength) in strengths.iter().enumerate() {
                let mut cluster = Cluster::new(strength, self.membership_threshold);
                for &i in &partition[j] {
                    cluster.add_member(ClusterMember::new(i, tps[i].first, sils[i]), false);
                }
                cluster.sort_members();
                if !cluster.is_empty() {
                    clusters.push(cluster);
                }
            }
            (clusters, crisp_score)
        }
    }
}

#[cfg(test)]
mod test {
    use super::SpectralClustering;
    use crate::error::Error;
    use crate::fingerprint::Fingerprint;
    use crate::model::Cluster;

    // two blocks of three fingerprints; within-block similarity is 0.5 for
    // the first and 1/3 for the second, across blocks it is 0
    fn blocks() -> Vec<Option<Fingerprint>> {
        vec![
            Some(Fingerprint::from_set_bits(26, 0..6)),
            Some(Fingerprint::from_set_bits(26, [0, 1, 2, 3, 6, 7])),
            Some(Fingerprint::from_set_bits(26, [0, 1, 2, 3, 8, 9])),
            Some(Fingerprint::from_set_bits(26, 10..18)),
            Some(Fingerprint::from_set_bits(26, [10, 11, 12, 13, 18, 19, 20, 21])),
            Some(Fingerprint::from_set_bits(26, [10, 11, 12, 13, 22, 23, 24, 25])),
        ]
    }

    fn items(cluster: &Cluster<f64>) -> Vec<usize> {
        let mut items: Vec<usize> = cluster.members().iter().map(|m| m.item()).collect();
        items.sort_unstable();
        items
    }

    #[test]
    fn rank_two_recovers_both_blocks() {
        let result = SpectralClustering::<f64>::new(2).fit(&blocks()).unwrap();
        assert_eq!(result.rank, 2);
        assert_eq!(result.u_clusters.len(), 2);
        assert_eq!(items(&result.u_clusters[0]), vec![0, 1, 2]);
        assert_eq!(items(&result.u_clusters[1]), vec![3, 4, 5]);
        // block eigenvalues are twice the within-block similarity
        assert!((result.u_clusters[0].strength() - 1.0).abs() < 1e-6);
        assert!((result.u_clusters[1].strength() - 2.0 / 3.0).abs() < 1e-6);
        // uniform blocks load uniformly, 1/sqrt(3) per member
        for cluster in &result.u_clusters {
            for member in cluster.members() {
                assert!((member.contribution() - 0.57735).abs() < 1e-4);
            }
        }
        assert!((result.u_score - 11.0 / 18.0).abs() < 1e-6);
    }

    #[test]
    fn rank_one_keeps_only_the_strongest_block() {
        let result = SpectralClustering::<f64>::new(1).fit(&blocks()).unwrap();
        assert_eq!(result.u_clusters.len(), 1);
        assert_eq!(items(&result.u_clusters[0]), vec![0, 1, 2]);
        // a lone cluster has no silhouette neighbor
        assert_eq!(result.u_score, 0.0);
    }

    #[test]
    fn left_and_right_bases_agree_on_symmetric_input() {
        let result = SpectralClustering::<f64>::new(2).fit(&blocks()).unwrap();
        assert_eq!(result.u_clusters.len(), result.v_clusters.len());
        for (u, v) in result.u_clusters.iter().zip(result.v_clusters.iter()) {
            assert_eq!(items(u), items(v));
        }
        assert!((result.u_score - result.v_score).abs() < 1e-9);
    }

    #[test]
    fn overlapping_mode_scores_with_the_fuzzy_silhouette() {
        let result = SpectralClustering::<f64>::new(2)
            .with_overlapping(true)
            .fit(&blocks())
            .unwrap();
        assert_eq!(result.u_clusters.len(), 2);
        assert_eq!(items(&result.u_clusters[0]), vec![0, 1, 2]);
        assert!(result.u_score > 0.0);
    }

    #[test]
    fn missing_fingerprints_stay_unclustered() {
        let mut fps = blocks();
        fps.push(None);
        let result = SpectralClustering::<f64>::new(2).fit(&fps).unwrap();
        for cluster in &result.u_clusters {
            assert!(!items(cluster).contains(&6));
        }
    }

    #[test]
    fn all_dissimilar_input_yields_empty_result() {
        let fps = vec![
            Some(Fingerprint::from_set_bits(8, [0, 1])),
            Some(Fingerprint::from_set_bits(8, [2, 3])),
        ];
        let result = SpectralClustering::<f64>::new(1).fit(&fps).unwrap();
        assert_eq!(result.rank, 0);
        assert!(result.u_clusters.is_empty());
        assert_eq!(result.u_score, 0.0);
    }

    #[test]
    fn input_validation() {
        assert_eq!(
            SpectralClustering::<f64>::new(1).fit(&[]).unwrap_err(),
            Error::EmptyInput
        );
        assert_eq!(
            SpectralClustering::<f64>::new(0).fit(&blocks()).unwrap_err(),
            Error::InvalidParameter {
                name: "rank",
                message: "must be at least 1",
            }
        );
        let sparse = vec![None, Some(Fingerprint::from_set_bits(8, [0, 1]))];
        assert_eq!(
            SpectralClustering::<f64>::new(2).fit(&sparse).unwrap_err(),
            Error::InsufficientData {
                requested: 2,
                usable: 1,
            }
        );
    }
}
