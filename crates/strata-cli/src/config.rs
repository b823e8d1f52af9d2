// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strata_app::SessionOptions;
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "strata";
pub const CONFIG_PATH_ENV: &str = "STRATA_CONFIG_PATH";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DEMO_LATENCY: &str = "250ms";
const MAX_DEMO_LATENCY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub demo: Demo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            log: Log::default(),
            demo: Demo::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub title: Option<String>,
    pub footer: Option<String>,
    pub root_label: Option<String>,
    pub stretch: Option<bool>,
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Demo {
    pub seed: Option<u64>,
    pub latency: Option<String>,
}

impl Default for Demo {
    fn default() -> Self {
        Self {
            seed: Some(strata_testkit::DEMO_SEED),
            latency: Some(DEFAULT_DEMO_LATENCY.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and keep values under [ui], [log], and [demo]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level.trim()).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter: {level:?}",
                    path.display()
                )
            })?;
        }

        if self.log.file.as_deref().is_some_and(|file| file.trim().is_empty()) {
            bail!("log.file in {} must not be empty", path.display());
        }

        if let Some(latency) = &self.demo.latency {
            let parsed = parse_duration(latency)?;
            if parsed > MAX_DEMO_LATENCY {
                bail!(
                    "demo.latency in {} must be at most 30s, got {}",
                    path.display(),
                    latency
                );
            }
        }

        Ok(())
    }

    pub fn log_level(&self) -> &str {
        self.log
            .level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file.trim()));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
    }

    pub fn demo_seed(&self) -> u64 {
        self.demo.seed.unwrap_or(strata_testkit::DEMO_SEED)
    }

    pub fn demo_latency(&self) -> Result<Duration> {
        parse_duration(self.demo.latency.as_deref().unwrap_or(DEFAULT_DEMO_LATENCY))
    }

    pub fn apply_ui(&self, mut options: SessionOptions) -> SessionOptions {
        if let Some(title) = non_blank(&self.ui.title) {
            options = options.with_title(title);
        }
        if let Some(footer) = non_blank(&self.ui.footer) {
            options = options.with_footer(footer);
        }
        if let Some(label) = non_blank(&self.ui.root_label) {
            options = options.with_root_label(label);
        }
        if let Some(profile) = non_blank(&self.ui.profile) {
            options = options.with_profile(profile);
        }
        if let Some(stretch) = self.ui.stretch {
            options = options.with_stretch(stretch);
        }
        options
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# strata config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\n# title = \"Control Planes\"\nfooter = \"enter: open  /: search  ?: help\"\n# root_label = \"Control Planes\"\nstretch = false\n# profile = \"default\"\n\n[log]\n# STRATA_LOG overrides this filter\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/strata/strata.log)\n# file = \"/absolute/path/to/strata.log\"\n\n[demo]\nseed = {}\nlatency = \"{}\"\n",
            path.display(),
            DEFAULT_LOG_LEVEL,
            strata_testkit::DEMO_SEED,
            DEFAULT_DEMO_LATENCY,
        )
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid latency duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid latency duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s (for example 0ms or 250ms)")
}
