use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::LinkRule;
use crate::error::ReslinkError;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api_url: String,
    pub hostname: String,
    pub data_root: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub hostname: String,
    pub data_root: String,
    pub path: String,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ReslinkError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("reslink.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Err(ReslinkError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ReslinkError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ReslinkError::ConfigParse(err.to_string()))?;

        Ok(Self::resolve_config(config))
    }

    pub fn resolve_config(config: Config) -> ResolvedConfig {
        ResolvedConfig {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            hostname: config.hostname,
            data_root: config.data_root,
            path: config.path.unwrap_or_else(|| "resdk_results".to_string()),
        }
    }
}

/// JSON array of `{type, field, subfolder}` objects.
pub fn load_rules(path: &str) -> Result<Vec<LinkRule>, ReslinkError> {
    let content =
        fs::read_to_string(path).map_err(|_| ReslinkError::RulesRead(PathBuf::from(path)))?;
    serde_json::from_str(&content).map_err(|err| ReslinkError::RulesParse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldSelector;

    #[test]
    fn resolve_defaults_path() {
        let config = Config {
            api_url: "https://app.example.com/api/".to_string(),
            hostname: "hpc.example.edu".to_string(),
            data_root: "/storage/data".to_string(),
            path: None,
        };

        let resolved = ConfigLoader::resolve_config(config);
        assert_eq!(resolved.api_url, "https://app.example.com/api");
        assert_eq!(resolved.path, "resdk_results");
    }

    #[test]
    fn rules_file_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let rules_path = temp.path().join("rules.json");
        std::fs::write(
            &rules_path,
            r#"[
                {"type": "data:alignment:bam:bowtie2:", "field": "bam", "subfolder": "bams"},
                {"type": "data:chipseq:rose2:", "field": "ALL", "subfolder": "roses"}
            ]"#,
        )
        .unwrap();

        let rules = load_rules(rules_path.to_str().unwrap()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].subfolder, "bams");
        assert_eq!(rules[1].field, FieldSelector::All);
    }

    #[test]
    fn invalid_rule_type_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let rules_path = temp.path().join("rules.json");
        std::fs::write(
            &rules_path,
            r#"[{"type": "bam", "field": "bam", "subfolder": "bams"}]"#,
        )
        .unwrap();

        let err = load_rules(rules_path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ReslinkError::RulesParse(_)));
    }
}
