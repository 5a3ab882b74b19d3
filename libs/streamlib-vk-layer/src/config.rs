// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Layer configuration.
//!
//! Resolved once per process:
//! 1. YAML file named by `STREAMLIB_VK_LAYER_CONFIG` (defaults if unset,
//!    missing or unparseable)
//! 2. `STREAMLIB_VK_LAYER_TRACE`, `STREAMLIB_VK_LAYER_STREAMS` and
//!    `STREAMLIB_VK_LAYER_LOG` override individual fields

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{LayerError, Result};
use crate::trace::{JsonLinesSink, LogSink, NullSink, TraceSink};

/// Where trace packets go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSinkKind {
    /// Structured `tracing` events.
    #[default]
    Log,
    /// Streams are still declared, packets are dropped.
    Off,
    /// One JSON object per packet appended to `path`.
    JsonLines { path: PathBuf },
}

impl FromStr for TraceSinkKind {
    type Err = String;

    /// `log`, `off`, or anything else as a JSON-lines output path.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "" => Err("Empty trace sink. Valid values: log, off, <path>".to_string()),
            "log" => Ok(Self::Log),
            "off" | "none" => Ok(Self::Off),
            _ => Ok(Self::JsonLines {
                path: PathBuf::from(s),
            }),
        }
    }
}

/// Streams started as soon as they are declared. `None` means all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StreamSelection(Option<Vec<String>>);

impl StreamSelection {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn none() -> Self {
        Self(Some(Vec::new()))
    }

    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Some(names.into_iter().map(Into::into).collect()))
    }

    pub fn includes(&self, stream: &str) -> bool {
        match &self.0 {
            None => true,
            Some(names) => names.iter().any(|name| name == stream),
        }
    }
}

impl FromStr for StreamSelection {
    type Err = String;

    /// `all`, `none`, or a comma-separated list of stream names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "*" => Ok(Self::all()),
            "none" | "" => Ok(Self::none()),
            _ => Ok(Self::only(
                s.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty()),
            )),
        }
    }
}

/// Runtime configuration of the layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// `log`, `off`, or `json_lines: { path: ... }`.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub trace: TraceSinkKind,
    pub streams: StreamSelection,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            trace: TraceSinkKind::default(),
            streams: StreamSelection::default(),
            log: Self::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl LayerConfig {
    pub const CONFIG_ENV_VAR: &'static str = "STREAMLIB_VK_LAYER_CONFIG";
    pub const TRACE_ENV_VAR: &'static str = "STREAMLIB_VK_LAYER_TRACE";
    pub const STREAMS_ENV_VAR: &'static str = "STREAMLIB_VK_LAYER_STREAMS";
    pub const LOG_ENV_VAR: &'static str = "STREAMLIB_VK_LAYER_LOG";
    pub const DEFAULT_LOG_FILTER: &'static str = "warn";

    /// Load configuration from a YAML file. Returns error if the file is
    /// missing or cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LayerError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            LayerError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::info!("Loaded layer config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a YAML file, returning defaults if the file is
    /// missing or unparseable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Layer config {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through `lookup` instead of the process
    /// environment.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup(Self::CONFIG_ENV_VAR) {
            Some(path) if !path.trim().is_empty() => Self::load_or_default(Path::new(path.trim())),
            _ => Self::default(),
        };
        config.apply_overrides(lookup);
        config
    }

    /// Apply environment-style overrides. Unparseable values are logged and
    /// leave the field as it was.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(Self::TRACE_ENV_VAR) {
            match value.parse() {
                Ok(trace) => self.trace = trace,
                Err(e) => tracing::warn!("Ignoring {}: {}", Self::TRACE_ENV_VAR, e),
            }
        }

        if let Some(value) = lookup(Self::STREAMS_ENV_VAR) {
            match value.parse() {
                Ok(streams) => self.streams = streams,
                Err(e) => tracing::warn!("Ignoring {}: {}", Self::STREAMS_ENV_VAR, e),
            }
        }

        if let Some(value) = lookup(Self::LOG_ENV_VAR) {
            if !value.trim().is_empty() {
                self.log = value.trim().to_string();
            }
        }
    }

    /// Build the configured sink. A JSON-lines file that cannot be opened
    /// falls back to [`LogSink`].
    pub fn build_sink(&self) -> Arc<dyn TraceSink> {
        match &self.trace {
            TraceSinkKind::Log => Arc::new(LogSink),
            TraceSinkKind::Off => Arc::new(NullSink),
            TraceSinkKind::JsonLines { path } => match JsonLinesSink::create(path) {
                Ok(sink) => Arc::new(sink),
                Err(e) => {
                    tracing::warn!(
                        "Failed to open trace file {}: {}, logging packets instead",
                        path.display(),
                        e
                    );
                    Arc::new(LogSink)
                }
            },
        }
    }
}
