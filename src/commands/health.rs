use anyhow::{Result, bail};
use log::debug;
use std::io::Write;

use crate::{api::Predictor, runtime::Runtime};

use super::{ClientOptions, build_client};

/// Probe the inference API; fails when it is unreachable
#[tracing::instrument(skip(runtime, client_options))]
pub async fn health<R: Runtime>(
    runtime: R,
    verbose: bool,
    client_options: ClientOptions,
) -> Result<()> {
    let client = build_client(runtime, client_options)?;
    run(&client, verbose, &mut std::io::stdout()).await
}

pub(crate) async fn run<P: Predictor, W: Write>(
    predictor: &P,
    verbose: bool,
    out: &mut W,
) -> Result<()> {
    if !predictor.health_check().await {
        writeln!(out, "unreachable")?;
        bail!("Inference API at {} is unreachable", predictor.base_url());
    }

    if !verbose {
        writeln!(out, "healthy")?;
        return Ok(());
    }

    match predictor.health_report().await {
        Ok(report) => {
            writeln!(out, "api:    {}", predictor.base_url())?;
            writeln!(out, "status: {}", report.status)?;
            writeln!(
                out,
                "model:  {}",
                report.model.as_deref().unwrap_or("(unknown)")
            )?;
        }
        Err(e) => {
            // Reachable but the body is not a health report
            debug!("Failed to read health report: {}", e);
            writeln!(out, "api:    {}", predictor.base_url())?;
            writeln!(out, "status: healthy")?;
        }
    }

    Ok(())
}
