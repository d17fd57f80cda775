//! Structured identifiers parsed from URL path segments.
//!
//! A lease is addressed by five segments
//! (`owner/dseq/gseq/oseq/provider`), a deployment by two
//! (`owner/dseq`). Parsing validates structure only — whether the
//! identifier exists on chain is the backing provider's concern.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to build an identifier from raw path segments.
///
/// Always names the offending field so the gateway can answer with a
/// client error the caller can act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("path has {got} segments, expected {expected}")]
    SegmentCount { got: usize, expected: usize },
    #[error("empty {0}")]
    EmptyField(&'static str),
    #[error("invalid {field}: {source}")]
    InvalidNumber {
        field: &'static str,
        source: std::num::ParseIntError,
    },
}

fn parse_number<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    field: &'static str,
    value: &str,
) -> Result<T, ParseIdError> {
    value
        .parse()
        .map_err(|source| ParseIdError::InvalidNumber { field, source })
}

fn require_nonempty(field: &'static str, value: &str) -> Result<String, ParseIdError> {
    if value.is_empty() {
        return Err(ParseIdError::EmptyField(field));
    }
    Ok(value.to_string())
}

/// Identifies one deployment owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId {
    pub owner: String,
    pub dseq: u64,
}

impl DeploymentId {
    /// Build from raw path segments `[owner, dseq]`.
    pub fn from_path(parts: &[&str]) -> Result<Self, ParseIdError> {
        if parts.len() != 2 {
            return Err(ParseIdError::SegmentCount {
                got: parts.len(),
                expected: 2,
            });
        }
        Ok(Self {
            owner: require_nonempty("owner", parts[0])?,
            dseq: parse_number("dseq", parts[1])?,
        })
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.dseq)
    }
}

/// Identifies one lease: a deployment group's order matched to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseId {
    pub owner: String,
    pub dseq: u64,
    pub gseq: u32,
    pub oseq: u32,
    pub provider: String,
}

impl LeaseId {
    /// Build from raw path segments `[owner, dseq, gseq, oseq, provider]`.
    pub fn from_path(parts: &[&str]) -> Result<Self, ParseIdError> {
        if parts.len() != 5 {
            return Err(ParseIdError::SegmentCount {
                got: parts.len(),
                expected: 5,
            });
        }
        Ok(Self {
            owner: require_nonempty("owner", parts[0])?,
            dseq: parse_number("dseq", parts[1])?,
            gseq: parse_number("gseq", parts[2])?,
            oseq: parse_number("oseq", parts[3])?,
            provider: require_nonempty("provider", parts[4])?,
        })
    }

    /// The deployment this lease belongs to.
    pub fn deployment(&self) -> DeploymentId {
        DeploymentId {
            owner: self.owner.clone(),
            dseq: self.dseq,
        }
    }
}

impl std::fmt::Display for LeaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.owner, self.dseq, self.gseq, self.oseq, self.provider
        )
    }
}
