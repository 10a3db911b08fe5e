//! Configuration file support for raidview
//!
//! Loads per-report view settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.raidviewrc.json` next to the report document
//! 3. `raidview.config.json` next to the report document
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::pagination::PageSize;
use crate::presets::CollectionKind;
use crate::progress::DEFAULT_ANIMATION_DELAY_MS;
use crate::tooltip::{TooltipSettings, DEFAULT_HIDE_DELAY_MS, DEFAULT_OFFSET_PX};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Allowed range for the tooltip hide delay
const HIDE_DELAY_RANGE: std::ops::RangeInclusive<u64> = 1..=5000;

/// Upper bound for the progress animation delay
const MAX_ANIMATION_DELAY_MS: u64 = 10_000;

/// raidview configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaidviewConfig {
    /// Items per page for each collection
    #[serde(default)]
    pub page_sizes: Option<PerCollection<PageSizeSetting>>,

    /// Initial sort key for each collection
    #[serde(default)]
    pub default_sorts: Option<PerCollection<String>>,

    /// Heatmap tooltip behavior
    #[serde(default)]
    pub tooltip: Option<TooltipConfig>,

    /// Progress bar animation
    #[serde(default)]
    pub progress: Option<ProgressConfig>,
}

/// One optional value per collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerCollection<T> {
    pub vulnerabilities: Option<T>,
    pub complexity: Option<T>,
    pub priority: Option<T>,
}

impl<T> Default for PerCollection<T> {
    fn default() -> Self {
        PerCollection {
            vulnerabilities: None,
            complexity: None,
            priority: None,
        }
    }
}

impl<T> PerCollection<T> {
    pub fn get(&self, kind: CollectionKind) -> Option<&T> {
        match kind {
            CollectionKind::Vulnerabilities => self.vulnerabilities.as_ref(),
            CollectionKind::Complexity => self.complexity.as_ref(),
            CollectionKind::Priority => self.priority.as_ref(),
        }
    }
}

/// Page size as written in a config file: a count or `"all"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageSizeSetting {
    Count(usize),
    Keyword(String),
}

impl PageSizeSetting {
    pub fn to_page_size(&self) -> Option<PageSize> {
        match self {
            PageSizeSetting::Count(n) => PageSize::parse(&n.to_string()),
            PageSizeSetting::Keyword(s) => PageSize::parse(s),
        }
    }
}

/// Tooltip settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TooltipConfig {
    /// Delay before a left tooltip hides (default: 100)
    pub hide_delay_ms: Option<u64>,
    /// Gap between the hovered cell and the tooltip (default: 10.0)
    pub offset_px: Option<f64>,
}

/// Progress bar settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressConfig {
    /// Delay between page load and bar fill (default: 100)
    pub animation_delay_ms: Option<u64>,
}

/// Settings for one collection after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSettings {
    pub page_size: PageSize,
    pub default_sort: String,
}

/// Resolved configuration with every default filled in
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub vulnerabilities: CollectionSettings,
    pub complexity: CollectionSettings,
    pub priority: CollectionSettings,
    pub tooltip: TooltipSettings,
    pub animation_delay_ms: u64,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl RaidviewConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref sizes) = self.page_sizes {
            for kind in CollectionKind::ALL {
                if let Some(setting) = sizes.get(kind) {
                    if setting.to_page_size().is_none() {
                        anyhow::bail!(
                            "page_sizes.{} must be a positive integer or \"all\" (got {:?})",
                            kind,
                            setting
                        );
                    }
                }
            }
        }

        if let Some(ref sorts) = self.default_sorts {
            for kind in CollectionKind::ALL {
                if let Some(key) = sorts.get(kind) {
                    let keys = kind.sort_keys();
                    if !keys.iter().any(|k| k == key) {
                        anyhow::bail!(
                            "default_sorts.{} must be one of [{}] (got {})",
                            kind,
                            keys.join(", "),
                            key
                        );
                    }
                }
            }
        }

        if let Some(ref t) = self.tooltip {
            if let Some(delay) = t.hide_delay_ms {
                if !HIDE_DELAY_RANGE.contains(&delay) {
                    anyhow::bail!(
                        "tooltip.hide_delay_ms must be between {} and {} (got {})",
                        HIDE_DELAY_RANGE.start(),
                        HIDE_DELAY_RANGE.end(),
                        delay
                    );
                }
            }
            if let Some(offset) = t.offset_px {
                if !offset.is_finite() || offset < 0.0 {
                    anyhow::bail!("tooltip.offset_px must be non-negative (got {})", offset);
                }
            }
        }

        if let Some(ref p) = self.progress {
            if let Some(delay) = p.animation_delay_ms {
                if delay > MAX_ANIMATION_DELAY_MS {
                    anyhow::bail!(
                        "progress.animation_delay_ms must be at most {} (got {})",
                        MAX_ANIMATION_DELAY_MS,
                        delay
                    );
                }
            }
        }

        Ok(())
    }

    fn collection(&self, kind: CollectionKind) -> CollectionSettings {
        let page_size = self
            .page_sizes
            .as_ref()
            .and_then(|sizes| sizes.get(kind))
            .and_then(PageSizeSetting::to_page_size)
            .unwrap_or_else(|| kind.default_page_size());
        let default_sort = self
            .default_sorts
            .as_ref()
            .and_then(|sorts| sorts.get(kind))
            .cloned()
            .unwrap_or_else(|| kind.default_sort().to_string());
        CollectionSettings {
            page_size,
            default_sort,
        }
    }

    /// Resolve config into the form used by the page
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let tooltip = match &self.tooltip {
            Some(t) => TooltipSettings {
                hide_delay_ms: t.hide_delay_ms.unwrap_or(DEFAULT_HIDE_DELAY_MS),
                offset_px: t.offset_px.unwrap_or(DEFAULT_OFFSET_PX),
            },
            None => TooltipSettings::default(),
        };
        let animation_delay_ms = self
            .progress
            .as_ref()
            .and_then(|p| p.animation_delay_ms)
            .unwrap_or(DEFAULT_ANIMATION_DELAY_MS);

        Ok(ResolvedConfig {
            vulnerabilities: self.collection(CollectionKind::Vulnerabilities),
            complexity: self.collection(CollectionKind::Complexity),
            priority: self.collection(CollectionKind::Priority),
            tooltip,
            animation_delay_ms,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        RaidviewConfig::default().resolve()
    }

    pub fn collection(&self, kind: CollectionKind) -> &CollectionSettings {
        match kind {
            CollectionKind::Vulnerabilities => &self.vulnerabilities,
            CollectionKind::Complexity => &self.complexity,
            CollectionKind::Priority => &self.priority,
        }
    }

    pub fn collection_mut(&mut self, kind: CollectionKind) -> &mut CollectionSettings {
        match kind {
            CollectionKind::Vulnerabilities => &mut self.vulnerabilities,
            CollectionKind::Complexity => &mut self.complexity,
            CollectionKind::Priority => &mut self.priority,
        }
    }
}

/// Discover and load a config file from the document directory
///
/// Search order:
/// 1. `.raidviewrc.json`
/// 2. `raidview.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(RaidviewConfig, PathBuf)>> {
    for name in [".raidviewrc.json", "raidview.config.json"] {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<RaidviewConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: RaidviewConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a report document
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (RaidviewConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
