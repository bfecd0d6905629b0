//! Content hashing
//!
//! Declarations carry hashes as `<algorithm>=<hex>` (or `<algorithm>:<hex>`),
//! e.g. `md5=f0ef7081e1539ac00ef5b761b4fb01b3`. This module parses those
//! specifications and computes hex digests of byte content and files.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::{Error, Result};

/// Digest algorithms accepted in hash specifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Lowercase hex digest of `content`.
    pub fn digest(&self, content: &[u8]) -> String {
        match self {
            Self::Md5 => hex_digest::<Md5>(content),
            Self::Sha1 => hex_digest::<Sha1>(content),
            Self::Sha224 => hex_digest::<Sha224>(content),
            Self::Sha256 => hex_digest::<Sha256>(content),
            Self::Sha384 => hex_digest::<Sha384>(content),
            Self::Sha512 => hex_digest::<Sha512>(content),
        }
    }

    /// Lowercase hex digest of the file at `path`.
    pub fn digest_file(&self, path: &Path) -> Result<String> {
        let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(self.digest(&content))
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha224" => Ok(Self::Sha224),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::UnknownHashAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn hex_digest<D: Digest>(content: &[u8]) -> String
where
    sha2::digest::Output<D>: fmt::LowerHex,
{
    let mut hasher = D::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// An expected digest: algorithm plus lowercase hex value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashSpec {
    pub algorithm: HashAlgorithm,
    pub digest: String,
}

impl HashSpec {
    /// Hash `content` with `algorithm` and wrap the result.
    pub fn of(algorithm: HashAlgorithm, content: &[u8]) -> Self {
        Self {
            algorithm,
            digest: algorithm.digest(content),
        }
    }

    /// Whether `content` hashes to this digest.
    pub fn matches(&self, content: &[u8]) -> bool {
        self.algorithm.digest(content) == self.digest
    }

    /// Whether the file at `path` hashes to this digest.
    ///
    /// A missing file never matches.
    pub fn matches_file(&self, path: &Path) -> Result<bool> {
        match self.algorithm.digest_file(path) {
            Ok(actual) => Ok(actual == self.digest),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl FromStr for HashSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidHashSpec { spec: s.to_string() };

        let (name, digest) = s.trim().split_once(['=', ':']).ok_or_else(invalid)?;
        let algorithm: HashAlgorithm = name.parse()?;
        let digest = digest.trim().to_ascii_lowercase();

        let expected_len = algorithm.digest(b"").len();
        if digest.len() != expected_len || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        Ok(Self { algorithm, digest })
    }
}

impl fmt::Display for HashSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.algorithm, self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn md5_known_value() {
        assert_eq!(
            HashAlgorithm::Md5.digest(b"Hello world\n"),
            "f0ef7081e1539ac00ef5b761b4fb01b3"
        );
    }

    #[test]
    fn sha256_known_value() {
        assert_eq!(
            HashAlgorithm::Sha256.digest(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[rstest]
    #[case("md5=f0ef7081e1539ac00ef5b761b4fb01b3", HashAlgorithm::Md5)]
    #[case("MD5:F0EF7081E1539AC00EF5B761B4FB01B3", HashAlgorithm::Md5)]
    #[case(
        "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
        HashAlgorithm::Sha256
    )]
    fn parses_hash_specs(#[case] input: &str, #[case] algorithm: HashAlgorithm) {
        let spec: HashSpec = input.parse().unwrap();
        assert_eq!(spec.algorithm, algorithm);
        assert!(spec.digest.chars().all(|c| !c.is_ascii_uppercase()));
    }

    #[rstest]
    #[case("f0ef7081e1539ac00ef5b761b4fb01b3")]
    #[case("md5=abc")]
    #[case("crc32=deadbeef")]
    #[case("md5=zzef7081e1539ac00ef5b761b4fb01b3")]
    fn rejects_malformed_specs(#[case] input: &str) {
        assert!(input.parse::<HashSpec>().is_err());
    }

    #[test]
    fn spec_matches_content() {
        let spec: HashSpec = "md5=f0ef7081e1539ac00ef5b761b4fb01b3".parse().unwrap();
        assert!(spec.matches(b"Hello world\n"));
        assert!(!spec.matches(b"Hello\n"));
    }

    #[test]
    fn missing_file_never_matches() {
        let dir = tempfile::tempdir().unwrap();
        let spec = HashSpec::of(HashAlgorithm::Sha1, b"");
        assert!(!spec.matches_file(&dir.path().join("nope")).unwrap());
    }

    #[test]
    fn file_digest_matches_content_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "hello world").unwrap();

        let spec = HashSpec::of(HashAlgorithm::Sha512, b"hello world");
        assert!(spec.matches_file(&path).unwrap());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let spec = HashSpec::of(HashAlgorithm::Sha384, b"abc");
        let parsed: HashSpec = spec.to_string().parse().unwrap();
        assert_eq!(parsed, spec);
    }
}
