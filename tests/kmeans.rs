use ndarray::Array2;

use molcluster::{Fingerprint, KMeans};

/// Two chemical series as 8-bit fingerprints, expanded to dense vectors the
/// way the command-line tool feeds them in.
fn series_data() -> Array2<f64> {
    let fingerprints = vec![
        Fingerprint::from_set_bits(8, [0, 1, 2, 3]),
        Fingerprint::from_set_bits(8, [0, 1, 2]),
        Fingerprint::from_set_bits(8, [0, 1, 2, 3, 4]),
        Fingerprint::from_set_bits(8, [4, 5, 6, 7]),
        Fingerprint::from_set_bits(8, [4, 5, 6]),
        Fingerprint::from_set_bits(8, [3, 4, 5, 6, 7]),
    ];
    let mut data = Array2::zeros((fingerprints.len(), 8));
    for (i, fp) in fingerprints.iter().enumerate() {
        for (j, v) in fp.to_floats::<f64>().into_iter().enumerate() {
            data[(i, j)] = v;
        }
    }
    data
}

fn member_sets(result: &molcluster::KMeansResult<f64>) -> Vec<Vec<usize>> {
    let mut sets: Vec<Vec<usize>> = result
        .clusters
        .iter()
        .map(|c| {
            let mut items: Vec<usize> = c.members().iter().map(|m| m.item()).collect();
            items.sort_unstable();
            items
        })
        .collect();
    sets.sort();
    sets
}

#[test]
fn recovers_two_series() {
    let result = KMeans::new(2).fit(&series_data()).unwrap();
    assert_eq!(member_sets(&result), vec![vec![0, 1, 2], vec![3, 4, 5]]);
    assert!(result.score > 0.8);
}

#[test]
fn grouping_is_stable_across_seeds() {
    let data = series_data();
    let a = KMeans::new(2).with_seed(0).fit(&data).unwrap();
    let b = KMeans::new(2).with_seed(99).fit(&data).unwrap();
    assert_eq!(member_sets(&a), member_sets(&b));
}

#[test]
fn one_cluster_per_item_scores_zero() {
    // every cluster is a singleton, so no silhouette is defined
    let result = KMeans::new(6).fit(&series_data()).unwrap();
    assert_eq!(result.clusters.len(), 6);
    assert_eq!(result.score, 0.0);
}
