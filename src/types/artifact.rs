//! Artifact (node) types for the dependency graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a coordinate string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// Wrong number of `:`-separated segments.
    #[error("Invalid artifact coordinates '{0}': expected group:artifact[:type[:classifier]]:version")]
    SegmentCount(String),
    /// The artifact id segment is empty.
    #[error("Invalid artifact coordinates '{0}': artifact id is empty")]
    MissingArtifactId(String),
}

/// One artifact in a dependency graph.
///
/// Identity is the full coordinate tuple `(group, artifact, version, type, classifier)`.
/// Any field may be absent depending on how far resolution got; empty strings are
/// normalized to absent so `""` and a missing field denote the same artifact.
///
/// Fields are private: once an artifact is placed in a graph it is shared
/// behind an `Arc` and never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawArtifact")]
pub struct Artifact {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    #[serde(rename = "type")]
    artifact_type: Option<String>,
    classifier: Option<String>,
}

/// Wire form of [`Artifact`], normalized through [`Artifact::from_parts`].
#[derive(Deserialize)]
struct RawArtifact {
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    artifact_id: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "type")]
    artifact_type: Option<String>,
    #[serde(default)]
    classifier: Option<String>,
}

impl From<RawArtifact> for Artifact {
    fn from(raw: RawArtifact) -> Self {
        Self::from_parts(
            raw.group_id,
            raw.artifact_id,
            raw.version,
            raw.artifact_type,
            raw.classifier,
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Artifact {
    /// Create an artifact from group id, artifact id and version.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::from_parts(
            Some(group_id.into()),
            Some(artifact_id.into()),
            Some(version.into()),
            None,
            None,
        )
    }

    /// Create an artifact from optional coordinate fields.
    pub fn from_parts(
        group_id: Option<String>,
        artifact_id: Option<String>,
        version: Option<String>,
        artifact_type: Option<String>,
        classifier: Option<String>,
    ) -> Self {
        Self {
            group_id: non_empty(group_id),
            artifact_id: non_empty(artifact_id),
            version: non_empty(version),
            artifact_type: non_empty(artifact_type),
            classifier: non_empty(classifier),
        }
    }

    /// Set the packaging type.
    #[must_use]
    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = non_empty(Some(artifact_type.into()));
        self
    }

    /// Set the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = non_empty(Some(classifier.into()));
        self
    }

    /// Group identifier.
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    /// Artifact identifier.
    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    /// Version.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Packaging type (`jar`, `pom`, `war`, ...).
    pub fn artifact_type(&self) -> Option<&str> {
        self.artifact_type.as_deref()
    }

    /// Classifier (`sources`, `tests`, ...).
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }
}

impl FromStr for Artifact {
    type Err = CoordinateError;

    /// Parse `group:artifact[:type[:classifier]]:version`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn owned(part: &str) -> Option<String> {
            Some(part.trim().to_string())
        }

        let parts: Vec<&str> = s.trim().split(':').collect();

        let (group, artifact, artifact_type, classifier, version) = match parts.as_slice() {
            [g, a, v] => (owned(g), owned(a), None, None, owned(v)),
            [g, a, t, v] => (owned(g), owned(a), owned(t), None, owned(v)),
            [g, a, t, c, v] => (owned(g), owned(a), owned(t), owned(c), owned(v)),
            _ => return Err(CoordinateError::SegmentCount(s.to_string())),
        };

        let parsed = Self::from_parts(group, artifact, version, artifact_type, classifier);
        if parsed.artifact_id.is_none() {
            return Err(CoordinateError::MissingArtifactId(s.to_string()));
        }
        Ok(parsed)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.group_id().unwrap_or(""),
            self.artifact_id().unwrap_or("")
        )?;
        match (self.artifact_type(), self.classifier()) {
            (t, Some(c)) => write!(f, ":{}:{}", t.unwrap_or(""), c)?,
            (Some(t), None) => write!(f, ":{}", t)?,
            (None, None) => {}
        }
        write!(f, ":{}", self.version().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_normalize_to_absent() {
        let a = Artifact::from_parts(
            Some("org.example".into()),
            Some("core".into()),
            Some("1.0".into()),
            Some(String::new()),
            None,
        );
        let b = Artifact::new("org.example", "core", "1.0");

        assert_eq!(a, b);
        assert_eq!(a.artifact_type(), None);
    }

    #[test]
    fn test_deserialized_empty_fields_normalize_to_absent() {
        let json = r#"{"group_id":"org.example","artifact_id":"core","version":"1.0","type":"","classifier":""}"#;
        let a: Artifact = serde_json::from_str(json).unwrap();

        assert_eq!(a, Artifact::new("org.example", "core", "1.0"));
        assert_eq!(a.artifact_type(), None);
        assert_eq!(a.classifier(), None);
    }

    #[test]
    fn test_serde_preserves_identity() {
        let a = Artifact::new("org.example", "core", "1.0").with_type("jar");
        let json = serde_json::to_string(&a).unwrap();

        assert_eq!(serde_json::from_str::<Artifact>(&json).unwrap(), a);
    }

    #[test]
    fn test_parse_full_coordinates() {
        let a: Artifact = "org.example:core:jar:sources:1.2.3".parse().unwrap();

        assert_eq!(a.group_id(), Some("org.example"));
        assert_eq!(a.artifact_id(), Some("core"));
        assert_eq!(a.artifact_type(), Some("jar"));
        assert_eq!(a.classifier(), Some("sources"));
        assert_eq!(a.version(), Some("1.2.3"));
    }

    #[test]
    fn test_display_matches_parse_input() {
        for coords in [
            "org.example:core:1.0",
            "org.example:core:pom:1.0",
            "org.example:core:jar:tests:1.0",
            "org.example:core::tests:1.0",
        ] {
            let a: Artifact = coords.parse().unwrap();
            assert_eq!(a.to_string(), coords);
        }
    }

    #[test]
    fn test_parse_rejects_bad_coordinates() {
        assert_eq!(
            "core".parse::<Artifact>(),
            Err(CoordinateError::SegmentCount("core".to_string()))
        );
        assert!(matches!(
            "org.example::1.0".parse::<Artifact>(),
            Err(CoordinateError::MissingArtifactId(_))
        ));
        assert!("a:b:c:d:e:f".parse::<Artifact>().is_err());
    }

    #[test]
    fn test_classifier_is_part_of_identity() {
        let plain = Artifact::new("org.example", "core", "1.0");
        let sources = plain.clone().with_classifier("sources");

        assert_ne!(plain, sources);
    }
}
