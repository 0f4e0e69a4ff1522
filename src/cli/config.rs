use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::args::OutputFormat;
use sarlz_solver::types::well_known;
use sarlz_solver::{ResolverOptions, SynthesisOptions};

pub const CONFIG_FILE_NAME: &str = "sarlz.json";

/// Contents of `sarlz.json`. Every key is optional.
///
/// ```json
/// {
///   "format": "json",
///   "includeObject": false,
///   "resolver": { "excludedAncestors": ["io.sarl.lang.core.Agent"], "skipSynthetic": true },
///   "synthesis": { "maxDefaultParameters": 8 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SarlzConfig {
    pub format: Option<OutputFormat>,
    /// Walk `java.lang.Object` like any other ancestor.
    pub include_object: bool,
    pub resolver: ResolverOptions,
    pub synthesis: SynthesisOptions,
}

impl SarlzConfig {
    /// Resolver options with the root object excluded unless asked for.
    pub fn resolver_options(&self) -> ResolverOptions {
        let mut options = self.resolver.clone();
        if !self.include_object {
            options
                .excluded_ancestors
                .insert(well_known::OBJECT.to_string());
        }
        options
    }
}

pub fn parse_config(source: &str) -> Result<SarlzConfig> {
    let config = serde_json::from_str(source).context("failed to parse sarlz.json")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<SarlzConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Load the explicit config, else `sarlz.json` in `cwd`, else defaults.
pub fn discover_config(explicit: Option<&Path>, cwd: &Path) -> Result<SarlzConfig> {
    let path: Option<PathBuf> = match explicit {
        Some(path) if path.is_absolute() => Some(path.to_path_buf()),
        Some(path) => Some(cwd.join(path)),
        None => Some(cwd.join(CONFIG_FILE_NAME)).filter(|p| p.is_file()),
    };
    match path {
        Some(path) => load_config(&path),
        None => Ok(SarlzConfig::default()),
    }
}
