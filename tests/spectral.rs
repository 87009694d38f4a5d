use molcluster::{Cluster, Fingerprint, SpectralClustering};

/// Three series with within-series Tanimoto similarity 0.5, 0.4, and 1/3.
/// Series never share bits, so the similarity matrix is block diagonal and
/// each block's leading singular value is twice its within-series similarity.
fn three_series() -> Vec<Option<Fingerprint>> {
    vec![
        // similarity 0.5
        Some(Fingerprint::from_set_bits(48, 0..6)),
        Some(Fingerprint::from_set_bits(48, [0, 1, 2, 3, 6, 7])),
        Some(Fingerprint::from_set_bits(48, [0, 1, 2, 3, 8, 9])),
        // similarity 1/3
        Some(Fingerprint::from_set_bits(48, 10..18)),
        Some(Fingerprint::from_set_bits(48, [10, 11, 12, 13, 18, 19, 20, 21])),
        Some(Fingerprint::from_set_bits(48, [10, 11, 12, 13, 22, 23, 24, 25])),
        // similarity 0.4
        Some(Fingerprint::from_set_bits(48, 26..33)),
        Some(Fingerprint::from_set_bits(48, [26, 27, 28, 29, 33, 34, 35])),
        Some(Fingerprint::from_set_bits(48, [26, 27, 28, 29, 36, 37, 38])),
    ]
}

fn items(cluster: &Cluster<f64>) -> Vec<usize> {
    let mut items: Vec<usize> = cluster.members().iter().map(|m| m.item()).collect();
    items.sort_unstable();
    items
}

#[test]
fn rank_three_orders_series_by_strength() {
    let result = SpectralClustering::<f64>::new(3)
        .fit(&three_series())
        .unwrap();
    assert_eq!(result.rank, 3);
    assert_eq!(result.u_clusters.len(), 3);
    // strongest block first: similarities 0.5, 0.4, 1/3 give strengths
    // 1.0, 0.8, 2/3
    assert_eq!(items(&result.u_clusters[0]), vec![0, 1, 2]);
    assert_eq!(items(&result.u_clusters[1]), vec![6, 7, 8]);
    assert_eq!(items(&result.u_clusters[2]), vec![3, 4, 5]);
    assert!((result.u_clusters[0].strength() - 1.0).abs() < 1e-6);
    assert!((result.u_clusters[1].strength() - 0.8).abs() < 1e-6);
    assert!((result.u_clusters[2].strength() - 2.0 / 3.0).abs() < 1e-6);
    // silhouettes use the raw Tversky complement: own-cluster means are
    // 1/3, 4/9, 2/5 and every other cluster is at distance 1
    let expected = (3.0 * (2.0 / 3.0) + 3.0 * (5.0 / 9.0) + 3.0 * (3.0 / 5.0)) / 9.0;
    assert!((result.u_score - expected).abs() < 1e-6);
}

#[test]
fn rank_two_drops_the_weakest_series() {
    let result = SpectralClustering::<f64>::new(2)
        .fit(&three_series())
        .unwrap();
    assert_eq!(result.u_clusters.len(), 2);
    assert_eq!(items(&result.u_clusters[0]), vec![0, 1, 2]);
    assert_eq!(items(&result.u_clusters[1]), vec![6, 7, 8]);
}

#[test]
fn gaussian_sharpening_changes_the_matrix_but_not_the_score() {
    // sharpening rescales within-block similarities but keeps each block
    // uniform, so the same clusters fall out and the silhouette, which is
    // computed from the raw similarities, is unchanged
    let plain = SpectralClustering::<f64>::new(2)
        .fit(&three_series())
        .unwrap();
    let sharpened = SpectralClustering::<f64>::new(2)
        .with_gamma(4.0)
        .fit(&three_series())
        .unwrap();
    for (p, s) in plain.u_clusters.iter().zip(sharpened.u_clusters.iter()) {
        assert_eq!(items(p), items(s));
    }
    assert!((plain.u_score - sharpened.u_score).abs() < 1e-9);
    // strengths shrink under the transform
    assert!(sharpened.u_clusters[0].strength() < plain.u_clusters[0].strength());
}

#[test]
fn overlapping_clusters_carry_all_loading_items() {
    let result = SpectralClustering::<f64>::new(3)
        .with_overlapping(true)
        .fit(&three_series())
        .unwrap();
    assert_eq!(result.u_clusters.len(), 3);
    // blocks are orthogonal, so overlap mode reproduces the crisp clusters
    assert_eq!(items(&result.u_clusters[0]), vec![0, 1, 2]);
    assert!(result.u_score > 0.5);
}

#[test]
fn single_precision_pipeline() {
    let result = SpectralClustering::<f32>::new(3)
        .fit(&three_series())
        .unwrap();
    assert_eq!(result.u_clusters.len(), 3);
    assert!((result.u_clusters[0].strength() - 1.0).abs() < 1e-4);
}
