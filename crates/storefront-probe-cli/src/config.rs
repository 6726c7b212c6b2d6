//! CLI configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use storefront_probe::logging::LogFormat;
use storefront_probe::{
    parse_flag, ProbeResult, SuiteConfig, ENV_BASE_URL, ENV_CI, ENV_HEADLESS, ENV_OUTPUT_DIR,
    ENV_SITE_PROFILE, ENV_STORAGE_STATE_PATH,
};
use tracing::Level;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - navigation attempts and steps
    Verbose,
    /// Debug - every driver call
    Debug,
}

impl Verbosity {
    /// From `-q` and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    #[must_use]
    pub const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }

    /// Log level for the crate's own targets
    #[must_use]
    pub const fn log_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    Never,
}

impl ColorChoice {
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// Process-wide CLI settings
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub verbosity: Verbosity,
    pub color: ColorChoice,
    /// JSON log lines instead of the pretty format
    pub json_logs: bool,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub const fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Command-line values that take precedence over the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteOverrides {
    pub base_url: Option<String>,
    pub headless: bool,
    pub site_profile: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub storage_state: Option<PathBuf>,
}

impl SuiteOverrides {
    fn as_env(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        if let Some(url) = &self.base_url {
            vars.insert(ENV_BASE_URL, url.clone());
        }
        if self.headless {
            vars.insert(ENV_HEADLESS, "true".to_string());
        }
        if let Some(profile) = &self.site_profile {
            vars.insert(ENV_SITE_PROFILE, profile.clone());
        }
        if let Some(dir) = &self.output_dir {
            vars.insert(ENV_OUTPUT_DIR, dir.display().to_string());
        }
        if let Some(path) = &self.storage_state {
            vars.insert(ENV_STORAGE_STATE_PATH, path.display().to_string());
        }
        vars
    }

    /// Resolve against `lookup`, overrides first
    pub fn resolve_with<F>(&self, lookup: F) -> ProbeResult<SuiteConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = self.as_env();
        SuiteConfig::from_lookup(|key| vars.get(key).cloned().or_else(|| lookup(key)))
    }

    /// Resolve against the process environment
    pub fn resolve(&self) -> ProbeResult<SuiteConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }
}

/// CI runs default to JSON logs. Malformed values count as unset here and
/// are reported when the suite configuration resolves.
#[must_use]
pub fn running_in_ci() -> bool {
    ci_flag(std::env::var(ENV_CI).ok().as_deref())
}

fn ci_flag(value: Option<&str>) -> bool {
    value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| parse_flag(ENV_CI, v).ok())
        .unwrap_or(false)
}
