//! Configuration for traversal limits and resolution defaults.
//!
//! Load order: `.vocab/config.toml` → environment variables → defaults.

use crate::graph::Predicate;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    pub traversal: TraversalConfig,
    pub resolution: ResolutionConfig,
}

/// Walk bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Ceiling on edge hops for any walk whose caller gives no maximum.
    pub max_level: usize,
    /// Ceiling for full-hierarchy flattening. Flattening a large hierarchy
    /// is expensive; results cut at this depth may be incomplete.
    pub flatten_max_level: usize,
}

/// Canonicalization and batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Structural relationship types used when a request names none.
    pub structural: Vec<Predicate>,
    /// Resolve batch keys on the rayon pool.
    pub parallel_batches: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_level: 10,
            flatten_max_level: 10,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            structural: Predicate::DEFAULT_STRUCTURAL.to_vec(),
            parallel_batches: true,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl VocabConfig {
    /// Load config from `.vocab/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".vocab").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("VOCAB_MAX_LEVEL", &mut config.traversal.max_level);
        env_override(
            "VOCAB_FLATTEN_MAX_LEVEL",
            &mut config.traversal.flatten_max_level,
        );
        env_override("VOCAB_PARALLEL", &mut config.resolution.parallel_batches);
        if let Ok(list) = std::env::var("VOCAB_STRUCTURAL") {
            config.resolution.structural = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<Predicate>())
                .collect::<std::result::Result<_, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.traversal.max_level == 0 || self.traversal.flatten_max_level == 0 {
            anyhow::bail!(
                "traversal ceilings must be at least 1 (max_level {}, flatten_max_level {})",
                self.traversal.max_level,
                self.traversal.flatten_max_level,
            );
        }
        if let Some(p) = self.resolution.structural.iter().find(|p| p.is_functional()) {
            anyhow::bail!("{} is functional and cannot be a default structural type", p);
        }
        Ok(())
    }
}
