use num_traits::Float;

/// Fixed-length bit fingerprint for one item.
///
/// Similarity calculations only need the set-operation counts, so bits are
/// packed into words and compared with popcounts. All fingerprints in one
/// dataset must share the same length; mixing lengths is a caller bug and
/// panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    words: Vec<u64>,
    n_bits: usize,
}

impl Fingerprint {
    /// Create an all-zero fingerprint of `n_bits` bits.
    pub fn new(n_bits: usize) -> Self {
        Self {
            words: vec![0; (n_bits + 63) / 64],
            n_bits,
        }
    }

    /// Create a fingerprint with the given bits set.
    pub fn from_set_bits<I>(n_bits: usize, bits: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut fp = Self::new(n_bits);
        for bit in bits {
            fp.set(bit);
        }
        fp
    }

    /// Set bit `idx`.
    pub fn set(&mut self, idx: usize) {
        assert!(idx < self.n_bits, "bit {} out of range", idx);
        self.words[idx / 64] |= 1 << (idx % 64);
    }

    /// Query bit `idx`.
    pub fn get(&self, idx: usize) -> bool {
        assert!(idx < self.n_bits, "bit {} out of range", idx);
        self.words[idx / 64] & (1 << (idx % 64)) != 0
    }

    /// Number of bits in the fingerprint.
    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of bits set in both `self` and `other`.
    pub fn intersection_count(&self, other: &Fingerprint) -> usize {
        assert_eq!(
            self.n_bits, other.n_bits,
            "fingerprint length mismatch: {} vs {}",
            self.n_bits, other.n_bits
        );
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Expand to a dense 0.0/1.0 vector, one value per bit.
    ///
    /// This is the conversion the Euclidean (k-means family) paths consume.
    pub fn to_floats<F>(&self) -> Vec<F>
    where
        F: Float,
    {
        (0..self.n_bits)
            .map(|i| if self.get(i) { F::one() } else { F::zero() })
            .collect()
    }
}
