//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Resource store fixtures referenced by the configuration

use crate::error::{Error, Result};
use jsonapi_spec::{Cardinality, MemoryStore, RelationshipRule, RelationshipRules};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resources the existence checks run against
    pub store: StoreConfig,

    /// Endpoint settings keyed by resource type
    pub resources: BTreeMap<String, ResourceConfig>,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LogSettings,
}

/// Resource store configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Fixture file of the form `{"posts": ["1", "2"]}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,

    /// Resources declared inline, merged over the fixture
    pub resources: MemoryStore,
}

/// Settings for the endpoint serving one resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Whether create requests may carry a client-generated id
    pub client_ids: bool,

    /// Relationship rules keyed by field name
    pub relationships: BTreeMap<String, RelationshipConfig>,
}

/// Rule for one relationship field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Allowed target types; empty allows any recognised type
    pub types: Vec<String>,

    /// Expected cardinality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration read from file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format (compact, full, json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Include thread IDs
    pub thread_ids: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            client_ids: true,
            relationships: BTreeMap::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { progress: true }
    }
}

/// Structured file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }
}

/// Read and deserialize a JSON, YAML or TOML file
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;

    let value = match FileFormat::of(path) {
        FileFormat::Yaml => serde_yaml::from_str(&content)?,
        FileFormat::Toml => toml::from_str(&content)?,
        FileFormat::Json => serde_json::from_str(&content)?,
    };

    Ok(value)
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        read_structured(path)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".jsonapi-spec.yaml"),
            PathBuf::from(".jsonapi-spec.yml"),
            PathBuf::from(".jsonapi-spec.json"),
            PathBuf::from(".jsonapi-spec.toml"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("jsonapi-spec");
            paths.push(dir.join("config.yaml"));
            paths.push(dir.join("config.json"));
            paths.push(dir.join("config.toml"));
        }

        paths
    }

    /// Build the resource store: the fixture (or `fixture_override`) with
    /// inline resources merged over it
    pub fn store(&self, fixture_override: Option<&Path>) -> Result<MemoryStore> {
        let mut store = match fixture_override.or(self.store.fixture.as_deref()) {
            Some(path) => read_structured::<MemoryStore>(path)?,
            None => MemoryStore::new(),
        };
        store.merge(self.store.resources.clone());

        tracing::debug!(types = store.types().count(), resources = store.len(), "Resource store loaded");
        Ok(store)
    }

    /// Whether create requests for `resource_type` may carry a client id
    pub fn client_ids(&self, resource_type: &str) -> bool {
        self.resources
            .get(resource_type)
            .map_or(true, |resource| resource.client_ids)
    }

    /// Relationship rules configured for `resource_type`
    pub fn relationship_rules(&self, resource_type: &str) -> Result<RelationshipRules> {
        let mut rules = RelationshipRules::new();
        let Some(resource) = self.resources.get(resource_type) else {
            return Ok(rules);
        };

        for (field, relationship) in &resource.relationships {
            rules.insert(field.clone(), relationship.rule(field)?);
        }
        Ok(rules)
    }

    /// Starter configuration written by `config init`
    pub fn starter() -> Self {
        let mut relationships = BTreeMap::new();
        relationships.insert(
            "author".to_string(),
            RelationshipConfig {
                types: vec!["users".to_string()],
                cardinality: Some(Cardinality::ToOne),
            },
        );
        relationships.insert(
            "tags".to_string(),
            RelationshipConfig {
                types: vec!["tags".to_string()],
                cardinality: Some(Cardinality::ToMany),
            },
        );

        let mut resources = BTreeMap::new();
        resources.insert(
            "posts".to_string(),
            ResourceConfig {
                client_ids: false,
                relationships,
            },
        );

        Self {
            store: StoreConfig {
                fixture: None,
                resources: MemoryStore::new()
                    .with_type("posts")
                    .with_resource("users", "1")
                    .with_resource("tags", "1"),
            },
            resources,
            ..Self::default()
        }
    }

    /// Serialize in the format named by `format`
    pub fn render(&self, format: FileFormat) -> Result<String> {
        let content = match format {
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Yaml => serde_yaml::to_string(self)?,
        };
        Ok(content)
    }

    /// Save configuration to a file, in the format its extension names
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render(FileFormat::of(path))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

impl RelationshipConfig {
    fn rule(&self, field: &str) -> Result<RelationshipRule> {
        let rule = if self.types.is_empty() {
            RelationshipRule::any()
        } else {
            RelationshipRule::of_types(field, self.types.iter().cloned())?
        };

        Ok(match self.cardinality {
            Some(cardinality) => rule.with_cardinality(cardinality),
            None => rule,
        })
    }
}
