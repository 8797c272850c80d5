//! Loading settings.
//!
//! Layered config: defaults -> default config file -> explicit file -> env vars.
//! Default file lives at `<config dir>/topic-toolkit/topics.{toml,yaml,json}`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::TopicsError;

/// Which sink implementation to build.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkBackend {
    /// Bundled in-process store
    #[default]
    InMemory,
    /// Third-party backend identified by name
    External(String),
}

/// Backend-specific sink settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSinkSettings {
    #[serde(default)]
    pub backend: SinkBackend,

    /// Collection (or table) holding the topics
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Name of the embedding model the sink should use
    #[serde(default)]
    pub embedding_model: Option<String>,

    /// Options passed through to the backend untouched
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

fn default_collection() -> String {
    "topics".to_string()
}

impl Default for TopicSinkSettings {
    fn default() -> Self {
        Self {
            backend: SinkBackend::default(),
            collection: default_collection(),
            embedding_model: None,
            options: BTreeMap::new(),
        }
    }
}

impl TopicSinkSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.collection.trim().is_empty() {
            return Err("collection must not be empty".to_string());
        }
        if let SinkBackend::External(name) = &self.backend {
            if name.trim().is_empty() {
                return Err("external backend name must not be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Settings for the loading stage. No sink configured by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicLoadingSettings {
    #[serde(default)]
    pub topics_sink: Option<TopicSinkSettings>,
}

impl TopicLoadingSettings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults (serde field defaults)
    /// 2. Default config file (optional)
    /// 3. Explicit config file (required when given)
    /// 4. Environment variables (`TOPICS_TOPICS_SINK__COLLECTION`, ...)
    pub fn load(config_path: Option<&str>) -> Result<Self, TopicsError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(&default_config_path().to_string_lossy()).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TOPICS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TopicsError::Config(e.to_string()))?;

        let settings: Self = config
            .try_deserialize()
            .map_err(|e| TopicsError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configured sink, if any.
    pub fn validate(&self) -> Result<(), TopicsError> {
        match &self.topics_sink {
            Some(sink) => sink.validate().map_err(TopicsError::Config),
            None => Ok(()),
        }
    }

    pub fn has_sink(&self) -> bool {
        self.topics_sink.is_some()
    }
}

fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "topic-toolkit")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topics")
}
