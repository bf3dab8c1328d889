// src/config.rs
//! Structured application configuration loaded from YAML.
//!
//! String fields may carry `${VAR}` placeholders which are expanded from the
//! process environment after parsing; a placeholder naming an unset variable
//! is a hard error. Credentials therefore never need to live in the file
//! itself.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Label under which a generated cover letter is injected into the manifest.
pub const COVER_LETTER_LABEL: &str = "Cover Letter";

/// Label-to-file mapping handed to the submission routine for document upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct UploadManifest(BTreeMap<String, PathBuf>);

impl UploadManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, path: impl Into<PathBuf>) {
        self.0.insert(label.into(), path.into());
    }

    pub fn remove(&mut self, label: &str) -> Option<PathBuf> {
        self.0.remove(label)
    }

    pub fn get(&self, label: &str) -> Option<&PathBuf> {
        self.0.get(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathBuf)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub username: String,
    pub password: String,
    pub phone_number: String,
    pub resume_path: PathBuf,
    #[serde(default = "default_ai_provider")]
    pub ai_provider: String,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(deserialize_with = "list_or_comma_joined")]
    pub positions: Vec<String>,
    pub locations: Vec<String>,
    #[serde(default)]
    pub uploads: UploadManifest,
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default)]
    pub blacklist_titles: Vec<String>,
    #[serde(default)]
    pub experience_level: Vec<String>,
}

fn default_ai_provider() -> String {
    "claude".to_string()
}

fn default_output_filename() -> String {
    "output.csv".to_string()
}

/// Accept `positions` as either a YAML list or a single comma-joined string.
fn list_or_comma_joined<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match ListOrString::deserialize(deserializer)? {
        ListOrString::List(items) => items,
        ListOrString::Joined(joined) => joined
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    })
}

impl AppConfig {
    /// Load, expand `${VAR}` placeholders and validate required fields.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: AppConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.expand_placeholders()?;
        config.validate()?;

        info!(
            "Loaded configuration: {} position(s), {} location(s), {} upload(s)",
            config.positions.len(),
            config.locations.len(),
            config.uploads.len()
        );

        Ok(config)
    }

    fn expand_placeholders(&mut self) -> Result<()> {
        self.username = expand_env(&self.username)?;
        self.password = expand_env(&self.password)?;
        self.phone_number = expand_env(&self.phone_number)?;

        let resume = expand_env(&self.resume_path.to_string_lossy())?;
        self.resume_path = PathBuf::from(resume);

        let mut expanded = BTreeMap::new();
        for (label, path) in self.uploads.iter() {
            expanded.insert(
                label.clone(),
                PathBuf::from(expand_env(&path.to_string_lossy())?),
            );
        }
        self.uploads = UploadManifest(expanded);

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("username", &self.username),
            ("password", &self.password),
            ("phone_number", &self.phone_number),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("Required config field is empty: {}", name);
            }
        }
        if self.resume_path.as_os_str().is_empty() {
            anyhow::bail!("Required config field is empty: resume_path");
        }
        if self.positions.is_empty() {
            anyhow::bail!("Config must list at least one position");
        }
        if self.locations.is_empty() {
            anyhow::bail!("Config must list at least one location");
        }
        Ok(())
    }
}

/// Replace every `${VAR}` occurrence with the value of the environment
/// variable `VAR`.
fn expand_env(value: &str) -> Result<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unterminated ${{ placeholder in: {}", value))?;
        let name = &after[..end];
        let resolved = std::env::var(name)
            .with_context(|| format!("Environment variable not set: {}", name))?;
        out.push_str(&resolved);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
username: alice@example.com
password: hunter2
phone_number: "5550100"
resume_path: data/resume.pdf
positions:
  - Software Engineer
locations:
  - Remote
uploads:
  Resume: data/resume.pdf
blacklist_titles:
  - Senior Director
"#;

    #[test]
    fn parses_structured_config() {
        let config: AppConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.username, "alice@example.com");
        assert_eq!(config.ai_provider, "claude");
        assert_eq!(config.output_filename, "output.csv");
        assert_eq!(config.blacklist_titles, vec!["Senior Director"]);
        assert_eq!(
            config.uploads.get("Resume"),
            Some(&PathBuf::from("data/resume.pdf"))
        );
    }

    #[test]
    fn normalizes_comma_joined_positions() {
        let yaml = r#"
username: u
password: p
phone_number: "1"
resume_path: r.pdf
positions: "Rust Developer, Backend Engineer , "
locations: [Remote]
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.positions, vec!["Rust Developer", "Backend Engineer"]);
    }

    #[test]
    fn expands_env_placeholders() {
        std::env::set_var("APPLYMATE_TEST_USER", "bob");
        assert_eq!(
            expand_env("${APPLYMATE_TEST_USER}@example.com").unwrap(),
            "bob@example.com"
        );
        assert_eq!(expand_env("no placeholders").unwrap(), "no placeholders");
    }

    #[test]
    fn missing_env_variable_is_an_error() {
        assert!(expand_env("${APPLYMATE_TEST_DEFINITELY_UNSET}").is_err());
    }

    #[test]
    fn rejects_empty_required_fields() {
        let yaml = r#"
username: ""
password: p
phone_number: "1"
resume_path: r.pdf
positions: [X]
locations: [Y]
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn manifest_restoration_round_trip() {
        let mut manifest = UploadManifest::new();
        manifest.insert("Resume", "data/resume.pdf");

        let original = manifest.clone();
        manifest.insert(COVER_LETTER_LABEL, "/tmp/cover_letter.pdf");
        assert_ne!(manifest, original);

        manifest.remove(COVER_LETTER_LABEL);
        assert_eq!(manifest, original);
    }
}
