//! Auth command handler: log in once, save the storage state

use crate::commands::AuthArgs;
use crate::error::CliResult;

pub fn execute_auth(args: &AuthArgs) -> CliResult<()> {
    let suite = args.site.overrides().resolve()?;
    capture::save_snapshot(&suite)
}

#[cfg(feature = "browser")]
mod capture {
    use crate::error::{CliError, CliResult};
    use crate::handlers::runtime;
    use std::sync::Arc;
    use storefront_probe::{
        capture_authenticated_state, ChromiumBrowser, ChromiumSessionFactory, SessionFactory,
        SuiteConfig,
    };
    use tracing::info;

    pub(super) fn save_snapshot(suite: &SuiteConfig) -> CliResult<()> {
        runtime()?.block_on(async {
            if let Some(parent) = suite.storage_state_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let browser = Arc::new(ChromiumBrowser::launch(suite.driver_config()).await?);
            let factory = ChromiumSessionFactory::new(browser);
            let site = suite.site_settings();

            let captured = async {
                let session = factory.open().await?;
                let result = capture_authenticated_state(
                    session.context(&site),
                    &suite.credentials(),
                    &suite.storage_state_path,
                )
                .await;
                session.teardown().await;
                result
            }
            .await;
            factory.shutdown().await;

            let state = captured?;
            info!(
                path = %suite.storage_state_path.display(),
                cookies = state.cookies.len(),
                "snapshot written"
            );
            println!(
                "Saved authentication state for {} to {}",
                suite.user_email,
                suite.storage_state_path.display()
            );
            Ok::<(), CliError>(())
        })
    }
}

#[cfg(not(feature = "browser"))]
mod capture {
    use crate::error::{CliError, CliResult};
    use storefront_probe::SuiteConfig;

    pub(super) fn save_snapshot(_suite: &SuiteConfig) -> CliResult<()> {
        Err(CliError::FeatureDisabled {
            command: "auth",
            feature: "browser",
        })
    }
}
