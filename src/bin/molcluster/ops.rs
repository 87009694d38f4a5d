use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::{stdout, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use ndarray::Array2;
use num_traits::Float;

use molcluster::{Cluster, Fingerprint};

#[derive(Debug)]
pub(crate) struct FileParseError {
    pub message: String,
}

/// Reads in a file formatted as (tab separated):
///     id1 bit1 bit2 bit3
///     id2 bit1 bit2 bit3
///
/// First column is the item id, remaining columns are fingerprint bits
/// All rows should be same length
/// Values should be floating-point decimal values; nonzero means set
///
/// Returns the dense vectors (k-means paths), the fingerprints (spectral
/// path) and the item ids. An all-zero row means the item has no
/// fingerprint and stays out of the similarity matrix.
pub(crate) fn from_file<F>(
    p: PathBuf,
) -> Result<(Array2<F>, Vec<Option<Fingerprint>>, Vec<String>), FileParseError>
where
    F: Float + Default + FromStr,
    <F as FromStr>::Err: Debug,
{
    let reader = BufReader::new(File::open(p).expect("Unable to open file"));
    let mut labels = Vec::new();
    let mut data: Vec<Vec<F>> = Vec::new();
    // Read tab-delimited file
    for (idx, line) in reader.lines().map(|l| l.unwrap()).enumerate() {
        if !line.contains('\t') {
            return Err(FileParseError {
                message: "Input file is not tab-delimited".to_string(),
            });
        }
        let mut line = line.split('\t');
        let id = match line.next() {
            Some(l) => l.to_string(),
            None => {
                return Err(FileParseError {
                    message: "Error loading line label".to_string(),
                })
            }
        };
        labels.push(id);
        let mut entry: Vec<F> = vec![];
        for s in line {
            match s.parse::<F>() {
                Ok(v) => {
                    entry.push(v);
                }
                Err(_) => {
                    return Err(FileParseError {
                        message: format!("Error parsing file at line {}", idx + 1),
                    })
                }
            };
        }
        data.push(entry);
    }
    // Validate data was loaded
    if data.len() <= 1 {
        return Err(FileParseError {
            message: "Data file is empty or only contains a single entry".to_string(),
        });
    }
    // Validate data all has same length
    let n_bits = data[0].len();
    for v in data.iter() {
        if v.len() != n_bits {
            return Err(FileParseError {
                message: "Input data rows must all be same length!".to_string(),
            });
        }
    }
    // Build the dense matrix and the fingerprints in one pass
    let mut out = Array2::<F>::default((data.len(), n_bits));
    let mut fingerprints = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let mut fp = Fingerprint::new(n_bits);
        for (j, v) in row.iter().enumerate() {
            out[(i, j)] = *v;
            if *v != F::zero() {
                fp.set(j);
            }
        }
        fingerprints.push(if fp.count_ones() == 0 { None } else { Some(fp) });
    }
    Ok((out, fingerprints, labels))
}

#[cfg(not(tarpaulin_include))]
pub(crate) fn display_clusters<F>(basis: &str, clusters: &[Cluster<F>], score: F, labels: &[String])
where
    F: Float + Display,
{
    let mut writer = BufWriter::new(stdout());
    // Output header
    writer
        .write_all(
            format!(
                "{} nClusters={} score={:.4}\n",
                basis,
                clusters.len(),
                score
            )
            .as_ref(),
        )
        .unwrap();
    clusters.iter().enumerate().for_each(|(idx, cluster)| {
        writer
            .write_all(
                format!(
                    ">Cluster={} size={} strength={:.4}\n",
                    idx + 1,
                    cluster.len(),
                    cluster.strength()
                )
                .as_ref(),
            )
            .unwrap();
        // Write members, strongest contribution first
        let mut it = cluster.members().iter();
        if let Some(member) = it.next() {
            writer.write_all(labels[member.item()].as_ref()).unwrap();
            it.for_each(|m| {
                writer.write_all(b",").unwrap();
                writer.write_all(labels[m.item()].as_ref()).unwrap();
            });
        }
        writer.write_all(b"\n").unwrap();
    });
    writer.flush().unwrap();
}
