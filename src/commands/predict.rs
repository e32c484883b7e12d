use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;

use crate::{
    api::Predictor,
    image::ImageSource,
    presentation::{prediction_message, recommendation},
    runtime::Runtime,
};

use super::{ClientOptions, build_client};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictOptions {
    /// Overrides the total number of attempts for the base64 request
    pub attempts: Option<usize>,
    /// Send the image as a multipart upload to `/predict`
    pub upload: bool,
    /// Print the raw result as JSON
    pub json: bool,
}

/// Classify a single image and print the result
#[tracing::instrument(skip(runtime, client_options))]
pub async fn predict<R: Runtime>(
    runtime: R,
    image: &str,
    options: PredictOptions,
    client_options: ClientOptions,
) -> Result<()> {
    let client = build_client(runtime, client_options)?;
    run(&client, image, &options, &mut std::io::stdout()).await
}

pub(crate) async fn run<P: Predictor, W: Write>(
    predictor: &P,
    image: &str,
    options: &PredictOptions,
    out: &mut W,
) -> Result<()> {
    let source = ImageSource::parse(image);
    info!(
        "Analysing {} with {}...",
        source.describe(),
        predictor.base_url()
    );

    let result = if options.upload {
        predictor.predict_upload(&source).await
    } else {
        predictor.predict_with_retry(&source, options.attempts).await
    }
    .with_context(|| format!("Failed to analyse {}", source.describe()))?;

    debug!("Server message: {}", result.message);

    if options.json {
        serde_json::to_writer_pretty(&mut *out, &result)
            .context("Failed to serialise prediction")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", prediction_message(&result, None))?;
        writeln!(out, "{}", recommendation(&result, None))?;
    }

    Ok(())
}
