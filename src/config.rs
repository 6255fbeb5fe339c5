//! Draw layout: bucket labels, half membership and category exclusions.
//! Loaded from YAML at runtime; [DrawConfig::default] is the Champions League group layout.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a YAML config used by the CLI when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "GROUPDRAW_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Half {
    #[serde(rename = "up")]
    Upper,
    #[serde(rename = "down")]
    Lower,
}

impl Half {
    pub fn opposite(self) -> Self {
        match self {
            Self::Upper => Self::Lower,
            Self::Lower => Self::Upper,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upper => "up",
            Self::Lower => "down",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub label: String,
    pub half: Half,
}

/// Two categories that may never share a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusivePair {
    pub first: String,
    pub second: String,
}

impl ExclusivePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// The category that clashes with `category`, if `category` is one side of the pair.
    pub fn counterpart(&self, category: &str) -> Option<&str> {
        if category == self.first {
            Some(&self.second)
        } else if category == self.second {
            Some(&self.first)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawConfig {
    pub buckets: Vec<BucketSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_categories: Option<ExclusivePair>,
    /// Place the two members of every designated pair in opposite halves.
    #[serde(default)]
    pub separate_paired: bool,
}

impl Default for DrawConfig {
    fn default() -> Self {
        let buckets = ["A", "B", "C", "D", "E", "F", "G", "H"]
            .iter()
            .enumerate()
            .map(|(index, label)| BucketSpec {
                label: (*label).to_string(),
                half: if index < 4 { Half::Upper } else { Half::Lower },
            })
            .collect();
        Self {
            buckets,
            exclusive_categories: Some(ExclusivePair::new("RUS", "UKR")),
            separate_paired: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("config declares no buckets")]
    NoBuckets,
    #[error("bucket label must not be empty")]
    EmptyLabel,
    #[error("duplicate bucket label '{0}'")]
    DuplicateLabel(String),
    #[error("halves must be the same size (up={upper}, down={lower})")]
    UnevenHalves { upper: usize, lower: usize },
    #[error("exclusive pair names category '{0}' twice")]
    DegenerateExclusivePair(String),
}

impl DrawConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buckets.is_empty() {
            return Err(ConfigError::NoBuckets);
        }
        let mut seen = HashSet::new();
        for bucket in &self.buckets {
            if bucket.label.trim().is_empty() {
                return Err(ConfigError::EmptyLabel);
            }
            if !seen.insert(bucket.label.as_str()) {
                return Err(ConfigError::DuplicateLabel(bucket.label.clone()));
            }
        }
        let upper = self.half_size(Half::Upper);
        let lower = self.half_size(Half::Lower);
        if upper != lower {
            return Err(ConfigError::UnevenHalves { upper, lower });
        }
        if let Some(pair) = &self.exclusive_categories {
            if pair.first == pair.second {
                return Err(ConfigError::DegenerateExclusivePair(pair.first.clone()));
            }
        }
        Ok(())
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn half_size(&self, half: Half) -> usize {
        self.buckets.iter().filter(|b| b.half == half).count()
    }

    /// Bucket specs in stable lexical label order.
    pub fn sorted_buckets(&self) -> Vec<&BucketSpec> {
        let mut sorted: Vec<&BucketSpec> = self.buckets.iter().collect();
        sorted.sort_by(|left, right| left.label.cmp(&right.label));
        sorted
    }
}

pub fn parse_config(raw: &str) -> Result<DrawConfig, ConfigError> {
    let config: DrawConfig = serde_yaml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<DrawConfig, ConfigError> {
    let raw = fs::read_to_string(path)?;
    parse_config(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_eight_groups_split_in_halves() {
        let config = DrawConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bucket_count(), 8);
        assert_eq!(config.half_size(Half::Upper), 4);
        assert_eq!(config.half_size(Half::Lower), 4);
        assert!(!config.separate_paired);
    }

    #[test]
    fn yaml_round_trips_halves_by_name() {
        let raw = r#"
buckets:
  - { label: "B", half: down }
  - { label: "A", half: up }
exclusive_categories: { first: RUS, second: UKR }
separate_paired: true
"#;
        let config = parse_config(raw).expect("config should parse");
        let labels: Vec<&str> = config
            .sorted_buckets()
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert!(config.separate_paired);
    }

    #[test]
    fn uneven_halves_are_rejected() {
        let raw = "buckets:\n  - { label: A, half: up }\n  - { label: B, half: up }\n";
        assert!(matches!(
            parse_config(raw),
            Err(ConfigError::UnevenHalves { upper: 2, lower: 0 })
        ));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let raw = "buckets:\n  - { label: A, half: up }\n  - { label: A, half: down }\n";
        assert!(matches!(parse_config(raw), Err(ConfigError::DuplicateLabel(label)) if label == "A"));
    }

    #[test]
    fn counterpart_is_symmetric() {
        let pair = ExclusivePair::new("RUS", "UKR");
        assert_eq!(pair.counterpart("RUS"), Some("UKR"));
        assert_eq!(pair.counterpart("UKR"), Some("RUS"));
        assert_eq!(pair.counterpart("ESP"), None);
    }
}
