//! One-way digests used to store and compare PINs.
//!
//! A stored record is pinned to the algorithm that produced it, so every
//! [`PinHash`] carries its algorithm tag alongside the hex digest. Records
//! written by earlier releases are bare SHA-1 hex and are still accepted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use strum::{Display, EnumString};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

const TAG_SEPARATOR: char = '$';
const LEGACY_SHA1_HEX_LEN: usize = 40;

/// Digest algorithms a PIN record can be produced with.
///
/// New variants can be added without touching stored records: each record
/// names its own algorithm and is verified with it.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-1. Only kept to read records written by earlier releases.
    Sha1,
    /// SHA-256.
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// Length of the raw digest in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Digests the UTF-8 bytes of `pin`.
    #[must_use]
    pub fn digest(self, pin: &str) -> PinHash {
        PinHash {
            algorithm: self,
            digest: self.digest_bytes(pin.as_bytes()),
        }
    }

    fn digest_bytes(self, input: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(input).to_vec(),
            Self::Sha256 => Sha256::digest(input).to_vec(),
            Self::Sha512 => Sha512::digest(input).to_vec(),
        }
    }
}

/// Reasons a stored record cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinHashParseError {
    /// The algorithm tag is not one this build knows.
    #[error("unknown digest algorithm `{0}`")]
    UnknownAlgorithm(String),
    /// The digest part is not lowercase hex.
    #[error("digest is not valid hex")]
    InvalidHex,
    /// The digest has the wrong size for its algorithm.
    #[error("expected {expected} digest bytes, found {actual}")]
    InvalidLength {
        /// Size the algorithm produces.
        expected: usize,
        /// Size found in the record.
        actual: usize,
    },
}

/// A digested PIN together with the algorithm that produced it.
///
/// The persisted form is `"<algorithm>$<hex>"`, e.g. `sha256$9f86…`.
///
/// Records have no `==`; compare with [`PinHash::ct_matches`].
///
/// ```compile_fail
/// use applock_core::DigestAlgorithm;
///
/// let hash = DigestAlgorithm::Sha256.digest("1234");
/// assert!(hash == DigestAlgorithm::Sha256.digest("1234"));
/// ```
#[derive(Clone)]
pub struct PinHash {
    algorithm: DigestAlgorithm,
    digest: Vec<u8>,
}

impl PinHash {
    /// Algorithm the record is pinned to.
    #[must_use]
    pub const fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.digest
    }

    /// Returns `true` if `candidate` digests to this record.
    ///
    /// The candidate is digested with the record's own algorithm and the two
    /// digests are compared in constant time.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        // A short PIN is recoverable from its digest, so the candidate's is wiped too.
        let computed = Zeroizing::new(self.algorithm.digest_bytes(candidate.as_bytes()));
        self.ct_eq_bytes(&computed)
    }

    /// Constant-time equality with another record. Records produced by
    /// different algorithms never compare equal.
    #[must_use]
    pub fn ct_matches(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.ct_eq_bytes(&other.digest)
    }

    fn ct_eq_bytes(&self, other: &[u8]) -> bool {
        self.digest.len() == other.len() && bool::from(self.digest.ct_eq(other))
    }

    /// Persisted form of the record.
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}{TAG_SEPARATOR}{}",
            self.algorithm,
            hex::encode(&self.digest)
        )
    }
}

impl FromStr for PinHash {
    type Err = PinHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, encoded) = match s.split_once(TAG_SEPARATOR) {
            Some((tag, encoded)) => {
                let algorithm = DigestAlgorithm::from_str(tag)
                    .map_err(|_| PinHashParseError::UnknownAlgorithm(tag.to_string()))?;
                (algorithm, encoded)
            }
            // Untagged records come from releases that only knew SHA-1.
            None if s.len() == LEGACY_SHA1_HEX_LEN => (DigestAlgorithm::Sha1, s),
            None => return Err(PinHashParseError::UnknownAlgorithm(String::new())),
        };

        let digest = hex::decode(encoded).map_err(|_| PinHashParseError::InvalidHex)?;
        if digest.len() != algorithm.output_len() {
            return Err(PinHashParseError::InvalidLength {
                expected: algorithm.output_len(),
                actual: digest.len(),
            });
        }

        Ok(Self { algorithm, digest })
    }
}

impl fmt::Display for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// Keeps digests out of logs.
impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinHash")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
