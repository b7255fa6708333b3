//! Simulator configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, `LODE_SIM_*` environment variables, then command-line flags
//! (applied by `main`).

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use lode_core::constants::MAX_CATEGORY;
use lode_unit::CollectPolicy;

/// Environment variable prefix, e.g. `LODE_SIM_DAYS=730`.
pub const ENV_PREFIX: &str = "LODE_SIM";

/// How settlements and the summary are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Unit category, 0..=5.
    pub category: u8,
    /// Simulated days after mining starts.
    pub days: u64,
    /// Collect every this many days. The last day always collects.
    pub collect_every: u64,
    /// Epoch day the simulation starts on.
    pub start_day: u64,
    pub collect_policy: CollectPolicy,
    pub output: OutputFormat,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            category: 2,
            days: 365,
            collect_every: 30,
            start_day: 20_000,
            collect_policy: CollectPolicy::default(),
            output: OutputFormat::default(),
        }
    }
}

impl SimConfig {
    /// Load from an optional file plus the process environment.
    ///
    /// Not validated: command-line flags may still override any value, so
    /// callers run [`SimConfig::validate`] once every layer is applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, ::config::Environment::with_prefix(ENV_PREFIX))
    }

    pub(crate) fn load_with(path: Option<&Path>, env: ::config::Environment) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("failed to read simulator configuration")?;
        settings
            .try_deserialize()
            .context("invalid simulator configuration")
    }

    pub fn validate(&self) -> Result<()> {
        if self.category > MAX_CATEGORY {
            bail!("category must be 0..={MAX_CATEGORY}, got {}", self.category);
        }
        if self.collect_every == 0 {
            bail!("collect_every must be at least 1");
        }
        if self.days == 0 {
            bail!("days must be at least 1");
        }
        Ok(())
    }
}
