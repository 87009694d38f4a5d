pub use error::{Error, Result};
pub use fingerprint::Fingerprint;
pub use fuzzy::{FuzzyKMeans, FuzzyKMeansResult};
pub use kmeans::{KMeans, KMeansResult};
pub use model::{crisp_partition, top_pairs, Cluster, ClusterMember, TopPair};
pub use silhouette::{crisp_silhouette, fuzzy_silhouette, mean_cluster_distances};
pub use similarity::{tversky_similarity, SimilarityTriple, Tversky};
pub use sparse::SparseColMat;
pub use spectral::{SpectralClustering, SpectralResult};

mod error;
mod fingerprint;
mod fuzzy;
mod kmeans;
mod model;
mod silhouette;
mod similarity;
mod sparse;
mod spectral;
