#[macro_use]
extern crate clap;

use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::str::FromStr;

use num_traits::Float;

use molcluster::{FuzzyKMeans, KMeans, SpectralClustering};

use crate::ops::{display_clusters, from_file};

mod ops;

#[allow(clippy::too_many_arguments)]
fn run<F>(
    input_file: &str,
    algorithm: &str,
    k: usize,
    restarts: usize,
    fuzziness: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
    sim_threshold: f64,
    membership_threshold: f64,
    overlapping: bool,
    seed: u64,
) where
    F: Float + Default + FromStr + Display + Send + Sync,
    <F as FromStr>::Err: Debug,
{
    let (data, fingerprints, labels) = match from_file::<F>(PathBuf::from(input_file)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e.message);
            exit(1);
        }
    };
    match algorithm {
        "spectral" => {
            let result = SpectralClustering::<F>::new(k)
                .with_weights(F::from(alpha).unwrap(), F::from(beta).unwrap())
                .with_gamma(F::from(gamma).unwrap())
                .with_similarity_threshold(F::from(sim_threshold).unwrap())
                .with_membership_threshold(F::from(membership_threshold).unwrap())
                .with_overlapping(overlapping)
                .fit(&fingerprints);
            match result {
                Ok(result) => {
                    display_clusters("U-basis", &result.u_clusters, result.u_score, &labels);
                    display_clusters("V-basis", &result.v_clusters, result.v_score, &labels);
                }
                Err(e) => {
                    eprintln!("{}", e);
                    exit(2);
                }
            }
        }
        "kmeans" => {
            let result = KMeans::new(k)
                .with_restarts(restarts)
                .with_seed(seed)
                .fit(&data);
            match result {
                Ok(result) => display_clusters("kmeans", &result.clusters, result.score, &labels),
                Err(e) => {
                    eprintln!("{}", e);
                    exit(2);
                }
            }
        }
        "fuzzy" => {
            let result = FuzzyKMeans::new(k)
                .with_restarts(restarts)
                .with_fuzziness(fuzziness)
                .with_membership_threshold(membership_threshold)
                .with_seed(seed)
                .fit(&data);
            match result {
                Ok(result) => display_clusters("fuzzy", &result.clusters, result.score, &labels),
                Err(e) => {
                    eprintln!("{}", e);
                    exit(2);
                }
            }
        }
        _ => {
            eprintln!("Unknown algorithm {}", algorithm);
            exit(2);
        }
    }
}

fn main() {
    let matches = clap_app!(molcluster =>
        (version: "0.1.0")
        (about: "Molecular fingerprint clustering by truncated SVD, k-means, and fuzzy k-means")
        (@arg INPUT: -i --input +takes_value +required "Path to tab-delimited fingerprint file")
        (@arg ALGORITHM: -a --algorithm +takes_value "Algorithm: spectral/kmeans/fuzzy, default=spectral")
        (@arg CLUSTERS: -k --clusters +takes_value "Number of clusters (SVD rank for spectral), default=2")
        (@arg RESTARTS: -n --restarts +takes_value "Random restarts for kmeans/fuzzy, default=10")
        (@arg FUZZINESS: -f --fuzziness +takes_value "Fuzziness exponent, must be > 1, default=2.0")
        (@arg ALPHA: -x --alpha +takes_value "Tversky alpha weight, default=1.0")
        (@arg BETA: -y --beta +takes_value "Tversky beta weight, default=1.0")
        (@arg GAMMA: -G --gamma +takes_value +allow_hyphen_values "Gaussian sharpening, <= -0.5 disables, default=-1.0")
        (@arg SIM_THRESH: -s --sim_threshold +takes_value "Similarity threshold, default=0.01")
        (@arg MEM_THRESH: -c --membership_threshold +takes_value "Membership threshold, default=0.01")
        (@arg OVERLAP: -o --overlapping "Allow overlapping spectral clusters")
        (@arg SEED: -S --seed +takes_value "Random seed, default=0")
        (@arg PRECISION: -r --precision +takes_value "Set f32 or f64 precision, default=f32")
    )
    .get_matches();

    let input_file = matches.value_of("INPUT").unwrap().to_string();
    if !Path::new(&input_file).exists() {
        eprintln!("Unable to locate input file {}", input_file);
        exit(1);
    }
    let algorithm = matches.value_of("ALGORITHM").unwrap_or("spectral");
    let k = matches
        .value_of("CLUSTERS")
        .unwrap_or("2")
        .parse::<usize>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse clusters");
            exit(1);
        });
    let restarts = matches
        .value_of("RESTARTS")
        .unwrap_or("10")
        .parse::<usize>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse restarts");
            exit(1);
        });
    let fuzziness = matches
        .value_of("FUZZINESS")
        .unwrap_or("2.0")
        .parse::<f64>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse fuzziness");
            exit(1);
        });
    let alpha = matches
        .value_of("ALPHA")
        .unwrap_or("1.0")
        .parse::<f64>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse alpha");
            exit(1);
        });
    let beta = matches
        .value_of("BETA")
        .unwrap_or("1.0")
        .parse::<f64>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse beta");
            exit(1);
        });
    let gamma = matches
        .value_of("GAMMA")
        .unwrap_or("-1.0")
        .parse::<f64>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse gamma");
            exit(1);
        });
    let sim_threshold = matches
        .value_of("SIM_THRESH")
        .unwrap_or("0.01")
        .parse::<f64>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse sim_threshold");
            exit(1);
        });
    let membership_threshold = matches
        .value_of("MEM_THRESH")
        .unwrap_or("0.01")
        .parse::<f64>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse membership_threshold");
            exit(1);
        });
    let seed = matches
        .value_of("SEED")
        .unwrap_or("0")
        .parse::<u64>()
        .unwrap_or_else(|_| {
            eprintln!("Unable to parse seed");
            exit(1);
        });
    let overlapping = matches.is_present("OVERLAP");
    let precision = matches.value_of("PRECISION").unwrap_or("f32");

    // Validate values
    if k < 1 || restarts < 1 || fuzziness <= 1. || alpha < 0. || beta < 0. {
        eprintln!("Improper parameter set!");
        exit(2);
    }

    match precision {
        "f64" => run::<f64>(
            &input_file,
            algorithm,
            k,
            restarts,
            fuzziness,
            alpha,
            beta,
            gamma,
            sim_threshold,
            membership_threshold,
            overlapping,
            seed,
        ),
        _ => run::<f32>(
            &input_file,
            algorithm,
            k,
            restarts,
            fuzziness,
            alpha,
            beta,
            gamma,
            sim_threshold,
            membership_threshold,
            overlapping,
            seed,
        ),
    };
}
