//! Streaming content digests.
//!
//! # Overview
//!
//! The [`Hasher`] reads a file in fixed-size chunks and feeds them to one of
//! the supported [`DigestAlgorithm`]s, returning the digest as lowercase hex.
//! The pipeline treats the algorithm as an opaque `bytes -> digest` function;
//! which one is picked only trades speed against collision resistance.
//!
//! Two files with equal digests are treated as identical. No byte-for-byte
//! comparison follows, so MD5 in particular should not be trusted against
//! adversarial input.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use digest::Digest;
use serde::{Deserialize, Serialize};

use super::HashError;

/// Read buffer size for streaming (64KB).
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Supported digest algorithms, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// MD5 (128-bit). Fastest of the RustCrypto tiers, not collision resistant.
    Md5,
    /// SHA-1 (160-bit).
    Sha1,
    /// SHA-256 (256-bit).
    Sha256,
    /// BLAKE3 (256-bit). Cryptographic strength at MD5-or-better speed.
    Blake3,
}

impl DigestAlgorithm {
    /// All algorithms, in the order they are offered on the command line.
    pub const ALL: [DigestAlgorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Blake3];

    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Length of the hex digest this algorithm produces.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 | Self::Blake3 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an algorithm name that is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown digest algorithm '{0}' (expected one of: md5, sha1, sha256, blake3)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for DigestAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Streaming file hasher for one algorithm.
///
/// `Hasher` holds no per-file state, so a single instance can be shared
/// across worker threads.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: DigestAlgorithm,
    buffer_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a hasher for `algorithm` with the default buffer size.
    #[must_use]
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            buffer_size: BUFFER_SIZE,
            shutdown_flag: None,
        }
    }

    /// Override the read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Abort reads between chunks once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The algorithm this hasher computes.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Compute the hex digest of a file's full content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or if
    /// shutdown is requested while reading.
    pub fn digest_file(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.digest_reader(file, path)
    }

    /// Compute the hex digest of everything `reader` yields.
    ///
    /// `path` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] on read failure or shutdown.
    pub fn digest_reader<R: Read>(&self, reader: R, path: &Path) -> Result<String, HashError> {
        match self.algorithm {
            DigestAlgorithm::Md5 => self.stream::<md5::Md5, R>(reader, path),
            DigestAlgorithm::Sha1 => self.stream::<sha1::Sha1, R>(reader, path),
            DigestAlgorithm::Sha256 => self.stream::<sha2::Sha256, R>(reader, path),
            DigestAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                self.pump(reader, path, |chunk| {
                    hasher.update(chunk);
                })?;
                Ok(hasher.finalize().to_hex().to_string())
            }
        }
    }

    /// Compute the hex digest of an in-memory buffer.
    #[must_use]
    pub fn digest_bytes(&self, bytes: &[u8]) -> String {
        match self.algorithm {
            DigestAlgorithm::Md5 => format!("{:x}", md5::Md5::digest(bytes)),
            DigestAlgorithm::Sha1 => format!("{:x}", sha1::Sha1::digest(bytes)),
            DigestAlgorithm::Sha256 => format!("{:x}", sha2::Sha256::digest(bytes)),
            DigestAlgorithm::Blake3 => blake3::hash(bytes).to_hex().to_string(),
        }
    }

    fn stream<D: Digest, R: Read>(&self, reader: R, path: &Path) -> Result<String, HashError>
    where
        digest::Output<D>: fmt::LowerHex,
    {
        let mut hasher = D::new();
        self.pump(reader, path, |chunk| hasher.update(chunk))?;
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn pump<R: Read>(
        &self,
        mut reader: R,
        path: &Path,
        mut sink: impl FnMut(&[u8]),
    ) -> Result<(), HashError> {
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            match reader.read(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => sink(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}
