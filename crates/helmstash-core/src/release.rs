//! The canonical release record and label-selector matching.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Metadata about one deployed release of a chart.
///
/// The serde field names are the bulk interchange contract: `load` and
/// `dump` exchange JSON arrays of these records, and external tooling
/// depends on the exact spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub unique_id: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chart: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub values: String,
}

impl Release {
    /// Checks whether this release's labels satisfy `selector`.
    ///
    /// Every selector pair must match: the key must be present, and when
    /// the selector value is non-empty the label value must equal it
    /// exactly. An empty selector value only requires key presence. An
    /// empty selector matches everything.
    pub fn matches_selector(&self, selector: &HashMap<String, String>) -> bool {
        if self.labels.is_empty() && !selector.is_empty() {
            return false;
        }
        selector.iter().all(|(key, value)| {
            match self.labels.get(key) {
                Some(label) => value.is_empty() || label == value,
                None => false,
            }
        })
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.unique_id, self.name, self.chart, self.version
        )
    }
}

/// A collection of releases. List order is backend-defined and never
/// relied upon.
pub type Releases = Vec<Release>;

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_matches_selector() {
        let cases = vec![
            (
                labels(&[("region", "us"), ("environment", "test")]),
                labels(&[("region", "us"), ("environment", "test")]),
                true,
            ),
            (
                labels(&[("region", "us"), ("environment", "test")]),
                labels(&[("region", "us"), ("environment", "")]),
                true,
            ),
            // An empty label value does not satisfy a non-empty selector
            // value.
            (
                labels(&[("region", "us"), ("environment", "")]),
                labels(&[("region", "us"), ("environment", "test")]),
                false,
            ),
            (
                labels(&[]),
                labels(&[("region", "us"), ("environment", "test")]),
                false,
            ),
            (
                labels(&[("region", "us"), ("environment", "test")]),
                labels(&[]),
                true,
            ),
            (
                labels(&[("region", "us")]),
                labels(&[("region", "us"), ("environment", "test")]),
                false,
            ),
        ];

        for (release_labels, selector, want) in cases {
            let release = Release {
                labels: release_labels.clone(),
                ..Default::default()
            };
            assert_eq!(
                release.matches_selector(&selector),
                want,
                "labels {release_labels:?} vs selector {selector:?}"
            );
        }
    }

    #[test]
    fn test_empty_selector_matches_unlabeled_release() {
        let release = Release::default();
        assert!(release.matches_selector(&HashMap::new()));
    }

    #[test]
    fn test_interchange_field_names() {
        let release = Release {
            unique_id: "abc123".to_string(),
            labels: labels(&[("region", "us")]),
            name: "prom1".to_string(),
            chart: "stable/prometheus".to_string(),
            namespace: "default".to_string(),
            version: "0.1.3".to_string(),
            values: "{}".to_string(),
        };

        let json = serde_json::to_value(&release).unwrap();
        let object = json.as_object().unwrap();
        for field in [
            "unique_id",
            "labels",
            "name",
            "chart",
            "namespace",
            "version",
            "values",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
        }

        let parsed: Release = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, release);
    }

    #[test]
    fn test_interchange_tolerates_missing_fields() {
        let parsed: Release =
            serde_json::from_str(r#"{"unique_id": "abc123", "name": "prom1"}"#).unwrap();
        assert_eq!(parsed.unique_id, "abc123");
        assert_eq!(parsed.name, "prom1");
        assert!(parsed.labels.is_empty());
        assert!(parsed.values.is_empty());
    }
}
