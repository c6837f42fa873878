//! Release <-> DynamoDB attribute map codec.
//!
//! The attribute names below are the persisted schema; data written by
//! earlier versions must stay readable, so they never change. Encoding is
//! sparse: empty fields are omitted rather than written as empty
//! attributes. Decoding tolerates any key casing and skips attributes it
//! does not recognize.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use helmstash_core::release::Release;

pub const ATTR_UNIQUE_ID: &str = "UniqueID";
pub const ATTR_LABELS: &str = "Labels";
pub const ATTR_NAME: &str = "Name";
pub const ATTR_CHART: &str = "Chart";
pub const ATTR_NAMESPACE: &str = "Namespace";
pub const ATTR_VERSION: &str = "Version";
pub const ATTR_VALUES: &str = "Values";

pub fn encode(release: &Release) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    let scalars = [
        (ATTR_UNIQUE_ID, &release.unique_id),
        (ATTR_NAME, &release.name),
        (ATTR_CHART, &release.chart),
        (ATTR_NAMESPACE, &release.namespace),
        (ATTR_VERSION, &release.version),
        (ATTR_VALUES, &release.values),
    ];
    for (attr, value) in scalars {
        if !value.is_empty() {
            item.insert(attr.to_string(), AttributeValue::S(value.clone()));
        }
    }
    if !release.labels.is_empty() {
        let labels = release
            .labels
            .iter()
            .map(|(key, value)| (key.clone(), AttributeValue::S(value.clone())))
            .collect();
        item.insert(ATTR_LABELS.to_string(), AttributeValue::M(labels));
    }
    item
}

pub fn decode(item: &HashMap<String, AttributeValue>) -> Release {
    let mut release = Release::default();
    for (attr, value) in item {
        match attr.to_ascii_lowercase().as_str() {
            "uniqueid" => {
                if let Ok(s) = value.as_s() {
                    release.unique_id = s.clone();
                }
            }
            "name" => {
                if let Ok(s) = value.as_s() {
                    release.name = s.clone();
                }
            }
            "chart" => {
                if let Ok(s) = value.as_s() {
                    release.chart = s.clone();
                }
            }
            "namespace" => {
                if let Ok(s) = value.as_s() {
                    release.namespace = s.clone();
                }
            }
            "version" => {
                if let Ok(s) = value.as_s() {
                    release.version = s.clone();
                }
            }
            "values" => {
                if let Ok(s) = value.as_s() {
                    release.values = s.clone();
                }
            }
            "labels" => {
                if let Ok(map) = value.as_m() {
                    release.labels = map
                        .iter()
                        .filter_map(|(key, value)| {
                            value.as_s().ok().map(|s| (key.clone(), s.clone()))
                        })
                        .collect();
                }
            }
            _ => {}
        }
    }
    release
}

#[cfg(test)]
mod tests {
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
    fn test_decode_full_item() {
        let mut item = encode(&full_release());
        item.insert(
            "Unused".to_string(),
            AttributeValue::S("nothing".to_string()),
        );
        assert_eq!(decode(&item), full_release());
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        let item = HashMap::from([
            (
                "uniqueID".to_string(),
                AttributeValue::S("abc123".to_string()),
            ),
            ("NAME".to_string(), AttributeValue::S("prom1".to_string())),
        ]);
        let release = decode(&item);
        assert_eq!(release.unique_id, "abc123");
        assert_eq!(release.name, "prom1");
    }

    #[test]
    fn test_decode_skips_non_string_attributes() {
        let item = HashMap::from([
            (
                ATTR_UNIQUE_ID.to_string(),
                AttributeValue::S("abc123".to_string()),
            ),
            (ATTR_NAME.to_string(), AttributeValue::N("42".to_string())),
        ]);
        let release = decode(&item);
        assert_eq!(release.unique_id, "abc123");
        assert!(release.name.is_empty());
    }

    #[test]
    fn test_encode_is_sparse() {
        let release = Release {
            unique_id: "abc123".to_string(),
            name: "prom1".to_string(),
            ..Default::default()
        };
        let item = encode(&release);
        assert_eq!(item.len(), 2);
        assert_eq!(
            item.get(ATTR_UNIQUE_ID),
            Some(&AttributeValue::S("abc123".to_string()))
        );
        assert_eq!(
            item.get(ATTR_NAME),
            Some(&AttributeValue::S("prom1".to_string()))
        );
        assert!(!item.contains_key(ATTR_LABELS));
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
    fn test_labels_encode_as_string_map() {
        let item = encode(&full_release());
        let labels = item.get(ATTR_LABELS).unwrap().as_m().unwrap();
        assert_eq!(
            labels.get("region"),
            Some(&AttributeValue::S("us".to_string()))
        );
        assert_eq!(
            labels.get("environment"),
            Some(&AttributeValue::S("test".to_string()))
        );
    }
}
