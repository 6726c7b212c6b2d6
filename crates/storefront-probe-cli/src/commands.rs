//! CLI command definitions using clap

use crate::config::{ColorChoice, SuiteOverrides};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storefront_probe::suite::JourneyFilter;

/// Storefront Probe: resilient browser journeys against the demo store
#[derive(Parser, Debug)]
#[command(name = "storefront-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format; auto picks json when CI is set
    #[arg(long, default_value = "auto", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the journey suite against a real browser
    Run(RunArgs),

    /// Log in once and save the browser storage state for later runs
    Auth(AuthArgs),

    /// List the journeys in the catalogue
    List(ListArgs),

    /// Print the resolved configuration as JSON
    Config(ConfigArgs),
}

/// Values shared by every command that talks to the site
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    /// Site root
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Navigation preset: responsive or slow
    #[arg(long, env = "SITE_PROFILE")]
    pub profile: Option<String>,

    /// Force a headless browser
    #[arg(long)]
    pub headless: bool,

    /// Root for test-results/, playwright-report/ and allure-results/
    #[arg(short, long, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Authentication snapshot location
    #[arg(long, env = "STORAGE_STATE_PATH")]
    pub storage_state: Option<PathBuf>,
}

impl SiteArgs {
    #[must_use]
    pub fn overrides(&self) -> SuiteOverrides {
        SuiteOverrides {
            base_url: self.base_url.clone(),
            headless: self.headless,
            site_profile: self.profile.clone(),
            output_dir: self.output_dir.clone(),
            storage_state: self.storage_state.clone(),
        }
    }
}

/// Journey selection shared by `run` and `list`
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Only journeys with this id (repeatable, e.g. --id TC01 --id TC09)
    #[arg(long = "id")]
    pub ids: Vec<String>,

    /// Only journeys with this tag (repeatable, e.g. --tag smoke)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
}

impl SelectArgs {
    #[must_use]
    pub fn filter(&self) -> JourneyFilter {
        let filter = self
            .ids
            .iter()
            .fold(JourneyFilter::all(), |f, id| f.with_id(id));
        self.tags.iter().fold(filter, |f, tag| f.with_tag(tag))
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    #[command(flatten)]
    pub select: SelectArgs,

    /// Stop at the first failed journey and skip the rest
    #[arg(long)]
    pub fail_fast: bool,

    /// Per-journey budget in seconds
    #[arg(long, default_value = "180")]
    pub journey_timeout: u64,

    /// Skip the home page reachability check before the run
    #[arg(long)]
    pub skip_preflight: bool,

    /// Fail before any journey runs when the authentication snapshot is missing
    #[arg(long)]
    pub require_auth: bool,
}

/// Arguments for the auth command
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(flatten)]
    pub site: SiteArgs,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub site: SiteArgs,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    Always,
    #[default]
    Auto,
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Always => Self::Always,
            ColorArg::Auto => Self::Auto,
            ColorArg::Never => Self::Never,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    #[default]
    Auto,
    Pretty,
    Json,
}

impl LogFormatArg {
    /// Whether to emit JSON, given whether the run is under CI
    #[must_use]
    pub const fn is_json(self, ci: bool) -> bool {
        match self {
            Self::Auto => ci,
            Self::Pretty => false,
            Self::Json => true,
        }
    }
}
