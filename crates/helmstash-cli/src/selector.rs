//! Label and selector flag parsing.
//!
//! Label-ish flags accept `k=v` pairs, either repeated or comma-separated
//! within one value. A bare `k` means "key present with any value".

use std::collections::HashMap;

/// Accumulates `k=v` flag values into a selector map. Later occurrences
/// of a key win.
pub fn parse_pairs(args: &[String]) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for arg in args {
        for pair in arg.split(',') {
            if pair.is_empty() {
                continue;
            }
            match pair.split_once('=') {
                Some((key, value)) => pairs.insert(key.to_string(), value.to_string()),
                None => pairs.insert(pair.to_string(), String::new()),
            };
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_pairs() {
        let cases = vec![
            (
                vec!["env=test", "region=eu1"],
                expected(&[("env", "test"), ("region", "eu1")]),
            ),
            // Later occurrences of a key win.
            (
                vec!["env=test", "region=eu1", "region=us2"],
                expected(&[("env", "test"), ("region", "us2")]),
            ),
            // Bare key means any value.
            (
                vec!["env", "region=us2"],
                expected(&[("env", ""), ("region", "us2")]),
            ),
            // Comma-separated within one flag value.
            (
                vec!["env=test,region=us2"],
                expected(&[("env", "test"), ("region", "us2")]),
            ),
            (vec!["env=test,"], expected(&[("env", "test")])),
            (vec![], expected(&[])),
        ];

        for (flags, want) in cases {
            let flags: Vec<String> = flags.into_iter().map(String::from).collect();
            assert_eq!(parse_pairs(&flags), want, "flags {flags:?}");
        }
    }

    #[test]
    fn test_value_may_contain_equals() {
        let parsed = parse_pairs(&["query=a=b".to_string()]);
        assert_eq!(parsed.get("query").map(String::as_str), Some("a=b"));
    }
}
