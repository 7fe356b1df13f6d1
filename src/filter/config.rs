//! Declarative filter-chain configuration.
//!
//! A chain is described as an ordered list of stages, innermost first:
//!
//! ```json
//! {
//!   "version": "filter_chain_v1",
//!   "stages": [
//!     { "kind": "scope", "scopes": "compile, runtime" },
//!     { "kind": "node_type", "types": ["jar"] },
//!     { "kind": "reachable" }
//!   ]
//! }
//! ```
//!
//! Token sets accept either a JSON list or a single comma/whitespace
//! separated string; both produce the same set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{
    tokenize, AncestorFilter, AnyFilter, FilterChain, FilterSource, NodeTypeFilter,
    ReachableFilter, ScopeFilter,
};
use crate::canonical::canonical_hash_hex;
use crate::types::{Artifact, CoordinateError};
use crate::DEFAULT_CHAIN_VERSION;

/// Error type for chain configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document is not valid.
    #[error("Invalid chain configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A stage names an artifact with malformed coordinates.
    #[error(transparent)]
    Coordinates(#[from] CoordinateError),
}

/// A set of tokens given as a list or as one delimited string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenList {
    /// Explicit list; entries are used verbatim.
    List(Vec<String>),
    /// Comma- or whitespace-separated tokens, trimmed.
    Delimited(String),
}

impl TokenList {
    /// The configured tokens as a set.
    pub fn tokens(&self) -> BTreeSet<String> {
        match self {
            Self::List(items) => items.iter().cloned().collect(),
            Self::Delimited(level) => tokenize(level).map(str::to_string).collect(),
        }
    }
}

impl Default for TokenList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// One stage of a configured chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// [`ScopeFilter`].
    Scope {
        /// Accepted scopes.
        #[serde(default)]
        scopes: TokenList,
    },
    /// [`NodeTypeFilter`].
    NodeType {
        /// Accepted artifact types.
        #[serde(default)]
        types: TokenList,
    },
    /// [`AncestorFilter`].
    Ancestors {
        /// Target coordinates, `group:artifact[:type[:classifier]]:version`.
        of: String,
    },
    /// [`ReachableFilter`].
    Reachable,
}

impl FilterSpec {
    /// Instantiate the stage with no input configured.
    pub fn to_filter(&self) -> Result<AnyFilter, ConfigError> {
        Ok(match self {
            Self::Scope { scopes } => AnyFilter::Scope(ScopeFilter::new(scopes.tokens())),
            Self::NodeType { types } => AnyFilter::NodeType(NodeTypeFilter::new(types.tokens())),
            Self::Ancestors { of } => AnyFilter::Ancestors(AncestorFilter::new(of.parse()?)),
            Self::Reachable => AnyFilter::Reachable(ReachableFilter::new()),
        })
    }

    fn canonical(&self) -> CanonicalStage {
        match self {
            Self::Scope { scopes } => CanonicalStage::Scope(scopes.tokens()),
            Self::NodeType { types } => CanonicalStage::NodeType(types.tokens()),
            Self::Ancestors { of } => CanonicalStage::Ancestors(
                of.parse::<Artifact>()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|_| of.clone()),
            ),
            Self::Reachable => CanonicalStage::Reachable,
        }
    }
}

/// Normalized stage parameters for deterministic hashing.
#[derive(Serialize)]
enum CanonicalStage {
    Scope(BTreeSet<String>),
    NodeType(BTreeSet<String>),
    Ancestors(String),
    Reachable,
}

#[derive(Serialize)]
struct CanonicalChain<'a> {
    version: &'a str,
    stages: Vec<CanonicalStage>,
}

fn default_version() -> String {
    DEFAULT_CHAIN_VERSION.to_string()
}

/// A configured filter chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Configuration version identifier.
    #[serde(default = "default_version")]
    pub version: String,
    /// Stages, innermost first.
    #[serde(default)]
    pub stages: Vec<FilterSpec>,
}

impl ChainConfig {
    /// Create a configuration from stages.
    pub fn new(stages: Vec<FilterSpec>) -> Self {
        Self {
            version: default_version(),
            stages,
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the chain on top of `source`.
    ///
    /// Every stage is validated before any is wired, so a bad stage anywhere
    /// fails the whole build.
    pub fn build(&self, source: FilterSource) -> Result<FilterChain, ConfigError> {
        let filters = self
            .stages
            .iter()
            .map(FilterSpec::to_filter)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(filters
            .into_iter()
            .fold(FilterChain::new(source), FilterChain::then))
    }

    /// Hash of the normalized configuration.
    ///
    /// Equivalent token spellings (list vs. delimited string, different order)
    /// hash identically.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(&CanonicalChain {
            version: &self.version,
            stages: self.stages.iter().map(FilterSpec::canonical).collect(),
        })
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
