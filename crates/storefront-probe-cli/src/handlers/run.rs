//! Run command handler

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use storefront_probe::reporter::FailureMode;
use storefront_probe::suite::{catalogue, JourneyFilter};

/// Run the selected journeys and write every report
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let filter = args.select.filter();
    let journeys = catalogue();
    if !journeys.iter().any(|j| filter.matches(j)) {
        return Err(CliError::invalid_argument(
            "no journey matches the given --id/--tag filters",
        ));
    }
    let suite = args.site.overrides().resolve()?;
    browser::run_suite(config, args, &suite, filter)
}

#[must_use]
pub const fn failure_mode(fail_fast: bool) -> FailureMode {
    if fail_fast {
        FailureMode::FailFast
    } else {
        FailureMode::CollectAll
    }
}

#[cfg(feature = "browser")]
mod browser {
    use super::{failure_mode, JourneyFilter};
    use crate::commands::RunArgs;
    use crate::config::CliConfig;
    use crate::error::{CliError, CliResult};
    use crate::handlers::runtime;
    use crate::output::ProgressReporter;
    use std::sync::Arc;
    use std::time::Duration;
    use storefront_probe::suite::{catalogue, preflight, RunSummary, SuiteRunner};
    use storefront_probe::{
        AuthSnapshot, ChromiumBrowser, ChromiumSessionFactory, FixtureManager, SessionFactory,
        SuiteConfig,
    };
    use tracing::{info, warn};

    pub(super) fn run_suite(
        config: &CliConfig,
        args: &RunArgs,
        suite: &SuiteConfig,
        filter: JourneyFilter,
    ) -> CliResult<()> {
        let dirs = suite.output_dirs();
        let mut fixtures = FixtureManager::new();
        fixtures.register(dirs.clone());
        let snapshot = AuthSnapshot::new(&suite.storage_state_path);
        fixtures.register(if args.require_auth {
            snapshot.required()
        } else {
            snapshot
        });
        fixtures.setup_all()?;

        let mut progress =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        let outcome = runtime()?.block_on(drive(args, suite, filter, &mut progress));
        progress.finish();
        for error in fixtures.teardown_all() {
            warn!(error = %error, "fixture teardown");
        }

        let summary = outcome?;
        let reporter = summary.reporter();
        progress.print_results(reporter);
        let paths = reporter.write_all(&dirs)?;
        info!(
            json = %paths.json.display(),
            junit = %paths.junit.display(),
            html = %paths.html.display(),
            allure = paths.allure.len(),
            "reports written"
        );
        progress.info(&format!("HTML report: {}", paths.html.display()));

        if summary.all_passed() {
            Ok(())
        } else {
            let mut message = format!("{} journey(s) failed", reporter.failed_count());
            if summary.stopped_early() {
                message.push_str(&format!(
                    ", {} skipped after the first failure",
                    reporter.skipped_count()
                ));
            }
            Err(CliError::journeys_failed(message))
        }
    }

    async fn drive(
        args: &RunArgs,
        suite: &SuiteConfig,
        filter: JourneyFilter,
        progress: &mut ProgressReporter,
    ) -> CliResult<RunSummary> {
        let browser = Arc::new(ChromiumBrowser::launch(suite.driver_config()).await?);
        let chromium = ChromiumSessionFactory::new(Arc::clone(&browser));
        let factory: Arc<dyn SessionFactory> = Arc::new(chromium.clone());
        let site = suite.site_settings();

        let outcome = async {
            if !args.skip_preflight {
                progress.start(&format!("checking {} is reachable", site.base_url));
                preflight(factory.as_ref(), &site).await?;
                progress.finish();
            }
            let runner = SuiteRunner::new(Arc::clone(&factory), site, suite.test_data())
                .with_snapshot(&suite.storage_state_path)
                .with_filter(filter)
                .with_journey_timeout(Duration::from_secs(args.journey_timeout))
                .with_failure_mode(failure_mode(args.fail_fast))
                .with_environment("site_profile", suite.site_profile.to_string())
                .with_environment("headless", suite.headless.to_string());
            let journeys = catalogue();
            progress.start(&format!(
                "running {} journey(s)",
                runner.selected(&journeys).len()
            ));
            Ok::<_, CliError>(runner.run(&journeys).await)
        }
        .await;

        chromium.shutdown().await;
        outcome
    }
}

#[cfg(not(feature = "browser"))]
mod browser {
    use super::JourneyFilter;
    use crate::commands::RunArgs;
    use crate::config::CliConfig;
    use crate::error::{CliError, CliResult};
    use storefront_probe::SuiteConfig;

    pub(super) fn run_suite(
        _config: &CliConfig,
        _args: &RunArgs,
        _suite: &SuiteConfig,
        _filter: JourneyFilter,
    ) -> CliResult<()> {
        Err(CliError::FeatureDisabled {
            command: "run",
            feature: "browser",
        })
    }
}
