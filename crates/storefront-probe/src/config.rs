//! Environment-driven suite configuration.
//!
//! Read once at process start; nothing reconfigures a run while it executes.

use crate::data::{TestData, UserCredentials};
use crate::driver::DriverConfig;
use crate::fixture::OutputDirs;
use crate::navigation::{NavigationPolicy, SiteProfile};
use crate::page_object::{SiteSettings, DEFAULT_BASE_URL};
use crate::result::{ProbeError, ProbeResult};
use crate::storage_state::DEFAULT_STORAGE_STATE_PATH;
use serde::Serialize;
use std::path::PathBuf;

pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_CI: &str = "CI";
pub const ENV_HEADLESS: &str = "HEADLESS";
pub const ENV_SITE_PROFILE: &str = "SITE_PROFILE";
pub const ENV_USER_EMAIL: &str = "TEST_USER_EMAIL";
pub const ENV_USER_PASSWORD: &str = "TEST_USER_PASSWORD";
pub const ENV_STORAGE_STATE_PATH: &str = "STORAGE_STATE_PATH";
pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Older spellings still honoured when the primary key is unset
const ENV_USER_EMAIL_ALIAS: &str = "TEST_USERNAME";
const ENV_USER_PASSWORD_ALIAS: &str = "TEST_PASSWORD";

pub const DEFAULT_USER_EMAIL: &str = "testuser@example.com";
pub const DEFAULT_USER_PASSWORD: &str = "password123";

/// Everything a run needs to know about its environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteConfig {
    pub base_url: String,
    pub ci: bool,
    pub headless: bool,
    #[serde(serialize_with = "display")]
    pub site_profile: SiteProfile,
    pub user_email: String,
    #[serde(skip)]
    pub user_password: String,
    pub storage_state_path: PathBuf,
    pub output_dir: PathBuf,
    pub chromium_path: Option<String>,
}

fn display<S: serde::Serializer>(profile: &SiteProfile, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(profile)
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ci: false,
            headless: false,
            site_profile: SiteProfile::default(),
            user_email: DEFAULT_USER_EMAIL.to_string(),
            user_password: DEFAULT_USER_PASSWORD.to_string(),
            storage_state_path: PathBuf::from(DEFAULT_STORAGE_STATE_PATH),
            output_dir: PathBuf::from("."),
            chromium_path: None,
        }
    }
}

impl SuiteConfig {
    /// Read the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] for malformed values.
    pub fn from_env() -> ProbeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset and empty keys take defaults.
    ///
    /// `CI` forces headless whatever `HEADLESS` says.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] for malformed values.
    pub fn from_lookup<F>(lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let ci = match get(ENV_CI) {
            Some(value) => parse_flag(ENV_CI, &value)?,
            None => false,
        };
        let headless = match get(ENV_HEADLESS) {
            _ if ci => true,
            Some(value) => parse_flag(ENV_HEADLESS, &value)?,
            None => defaults.headless,
        };
        let site_profile = match get(ENV_SITE_PROFILE) {
            Some(value) => SiteProfile::parse(&value).ok_or_else(|| ProbeError::Config {
                message: format!("{ENV_SITE_PROFILE}: expected 'responsive' or 'slow', got {value:?}"),
            })?,
            None => defaults.site_profile,
        };
        let base_url = get(ENV_BASE_URL).unwrap_or(defaults.base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ProbeError::Config {
                message: format!("{ENV_BASE_URL}: expected an http(s) URL, got {base_url:?}"),
            });
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ci,
            headless,
            site_profile,
            user_email: get(ENV_USER_EMAIL)
                .or_else(|| get(ENV_USER_EMAIL_ALIAS))
                .unwrap_or(defaults.user_email),
            user_password: get(ENV_USER_PASSWORD)
                .or_else(|| get(ENV_USER_PASSWORD_ALIAS))
                .unwrap_or(defaults.user_password),
            storage_state_path: get(ENV_STORAGE_STATE_PATH)
                .map_or(defaults.storage_state_path, PathBuf::from),
            output_dir: get(ENV_OUTPUT_DIR).map_or(defaults.output_dir, PathBuf::from),
            chromium_path: get(ENV_CHROMIUM_PATH),
        })
    }

    #[must_use]
    pub fn credentials(&self) -> UserCredentials {
        UserCredentials::new(&self.user_email, &self.user_password)
    }

    #[must_use]
    pub fn test_data(&self) -> TestData {
        TestData::new(self.credentials())
    }

    #[must_use]
    pub fn output_dirs(&self) -> OutputDirs {
        OutputDirs::new(&self.output_dir)
    }

    /// Base URL, navigation preset for the profile, screenshots under the output dir
    #[must_use]
    pub fn site_settings(&self) -> SiteSettings {
        SiteSettings::new(&self.base_url)
            .with_navigation(NavigationPolicy::for_profile(self.site_profile))
            .with_screenshot_dir(self.output_dirs().screenshots())
    }

    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        let config = DriverConfig::new().headless(self.headless);
        match &self.chromium_path {
            Some(path) => config.executable_path(path),
            None => config,
        }
    }
}

/// Boolean environment value: `1/true/yes/on` or `0/false/no/off`, any case
///
/// # Errors
///
/// Returns [`ProbeError::Config`] naming `key` for anything else.
pub fn parse_flag(key: &str, value: &str) -> ProbeResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ProbeError::Config {
            message: format!("{key}: expected a boolean, got {other:?}"),
        }),
    }
}
