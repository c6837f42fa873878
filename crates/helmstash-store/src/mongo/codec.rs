//! Release <-> BSON document codec.
//!
//! Same wire names and rules as the DynamoDB codec: sparse encoding,
//! case-insensitive decoding, unknown fields ignored. The two drivers
//! must stay mutually readable at the field-name level so a dump from one
//! backend loads into the other.

use helmstash_core::release::Release;
use mongodb::bson::{Bson, Document};

pub const FIELD_UNIQUE_ID: &str = "UniqueID";
pub const FIELD_LABELS: &str = "Labels";
pub const FIELD_NAME: &str = "Name";
pub const FIELD_CHART: &str = "Chart";
pub const FIELD_NAMESPACE: &str = "Namespace";
pub const FIELD_VERSION: &str = "Version";
pub const FIELD_VALUES: &str = "Values";

pub fn encode(release: &Release) -> Document {
    let mut document = Document::new();
    let scalars = [
        (FIELD_UNIQUE_ID, &release.unique_id),
        (FIELD_NAME, &release.name),
        (FIELD_CHART, &release.chart),
        (FIELD_NAMESPACE, &release.namespace),
        (FIELD_VERSION, &release.version),
        (FIELD_VALUES, &release.values),
    ];
    for (field, value) in scalars {
        if !value.is_empty() {
            document.insert(field, value.clone());
        }
    }
    if !release.labels.is_empty() {
        let mut labels = Document::new();
        for (key, value) in &release.labels {
            labels.insert(key.clone(), value.clone());
        }
        document.insert(FIELD_LABELS, labels);
    }
    document
}

pub fn decode(document: &Document) -> Release {
    let mut release = Release::default();
    for (field, value) in document {
        match field.to_ascii_lowercase().as_str() {
            "uniqueid" => {
                if let Bson::String(s) = value {
                    release.unique_id = s.clone();
                }
            }
            "name" => {
                if let Bson::String(s) = value {
                    release.name = s.clone();
                }
            }
            "chart" => {
                if let Bson::String(s) = value {
                    release.chart = s.clone();
                }
            }
            "namespace" => {
                if let Bson::String(s) = value {
                    release.namespace = s.clone();
                }
            }
            "version" => {
                if let Bson::String(s) = value {
                    release.version = s.clone();
                }
            }
            "values" => {
                if let Bson::String(s) = value {
                    release.values = s.clone();
                }
            }
            "labels" => {
                if let Bson::Document(map) = value {
                    release.labels = map
                        .iter()
                        .filter_map(|(key, value)| {
                            match value {
                                Bson::String(s) => Some((key.clone(), s.clone())),
                                _ => None,
                            }
                        })
                        .collect();
                }
            }
            // `_id` and anything else a future version writes.
            _ => {}
        }
    }
    release
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    fn full_release() -> Release {
        Release {
            unique_id: "abc123".to_string(),
            labels: [("region", "us"), ("environment", "test")]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            name: "prom1".to_string(),
            chart: "stable/prometheus".to_string(),
            namespace: "default".to_string(),
            version: "0.1.3".to_string(),
            values: r#"{"image": "prometheus"}"#.to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        assert_eq!(decode(&encode(&full_release())), full_release());

        let sparse = Release {
            unique_id: "abc123".to_string(),
            ..Default::default()
        };
        assert_eq!(decode(&encode(&sparse)), sparse);
    }

    #[test]
    fn test_encode_is_sparse() {
        let release = Release {
            unique_id: "abc123".to_string(),
            name: "prom1".to_string(),
            ..Default::default()
        };
        let document = encode(&release);
        assert_eq!(document.len(), 2);
        assert!(!document.contains_key(FIELD_LABELS));
    }

    #[test]
    fn test_decode_ignores_id_and_unknown_fields() {
        let document = doc! {
            "_id": "storage-assigned",
            "UniqueID": "abc123",
            "Unused": 42,
        };
        let release = decode(&document);
        assert_eq!(release.unique_id, "abc123");
        assert!(release.name.is_empty());
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        let document = doc! {
            "uniqueid": "abc123",
            "NAME": "prom1",
            "labels": { "region": "us" },
        };
        let release = decode(&document);
        assert_eq!(release.unique_id, "abc123");
        assert_eq!(release.name, "prom1");
        assert_eq!(release.labels.get("region").map(String::as_str), Some("us"));
    }

    #[test]
    fn test_decode_skips_non_string_label_values() {
        let document = doc! {
            "UniqueID": "abc123",
            "Labels": { "region": "us", "weight": 3 },
        };
        let release = decode(&document);
        assert_eq!(release.labels.len(), 1);
        assert_eq!(release.labels.get("region").map(String::as_str), Some("us"));
    }
}
