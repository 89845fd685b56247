// ABOUTME: Deploy command implementation.
// ABOUTME: Reads inputs and settings, opens sources, and runs the orchestrator.

use std::env;
use std::path::Path;

use netlify_upload::config::{ActionInputs, RunConfig, Settings};
use netlify_upload::deploy::run_deploy;
use netlify_upload::diagnostics::Diagnostics;
use netlify_upload::error::Result;
use netlify_upload::gateway::NetlifyGateway;
use netlify_upload::output::Output;
use netlify_upload::source::open_sources;
use tokio_util::sync::CancellationToken;

/// Upload the configured files to the configured site.
pub async fn deploy(
    settings_path: Option<&Path>,
    output: &mut Output,
    cancel: CancellationToken,
) -> Result<()> {
    output.start_timer();

    let settings = match settings_path {
        Some(path) => Settings::load(path)?,
        None => Settings::discover(&env::current_dir()?)?,
    };
    let inputs = ActionInputs::from_env(|token| output.set_secret(token.expose()))?;
    let config = RunConfig::new(inputs, settings)?;

    let mut diag = Diagnostics::default();
    let mut sources = open_sources(config.sources.iter(), &mut diag).await?;
    let gateway = NetlifyGateway::new(&config.token, &config.settings)?;

    let result = run_deploy(&config, &gateway, &mut sources, cancel, output, &mut diag).await;

    for warning in diag.warnings() {
        output.warn(&warning.message);
    }

    let outcome = result.map_err(Box::new)?;
    output.debug(&format!(
        "Uploaded {} file(s) to {} in deploy {}",
        outcome.uploaded.len(),
        outcome.site.name,
        outcome.deploy.id
    ));
    output.success("Files successfully uploaded to Netlify!");
    Ok(())
}
