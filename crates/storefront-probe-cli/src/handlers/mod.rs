//! Command handlers, one module per subcommand

pub mod auth;
pub mod config;
pub mod list;
pub mod run;

pub use auth::execute_auth;
pub use config::execute_config;
pub use list::execute_list;
pub use run::execute_run;

use crate::error::CliResult;

/// Runtime for the commands that drive a browser
pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
