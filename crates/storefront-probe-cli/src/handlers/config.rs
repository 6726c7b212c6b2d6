//! Config command handler

use crate::commands::ConfigArgs;
use crate::error::CliResult;
use storefront_probe::SuiteConfig;

/// Print the configuration a `run` with the same flags would use
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let suite = args.site.overrides().resolve()?;
    println!("{}", render_config(&suite)?);
    Ok(())
}

/// Pretty JSON; the password is never serialized
pub fn render_config(suite: &SuiteConfig) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(suite)?)
}
