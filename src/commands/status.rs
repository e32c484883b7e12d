use anyhow::{Context, Result};
use std::io::Write;

use crate::{api::Predictor, runtime::Runtime};

use super::{ClientOptions, build_client};

/// Print what the inference API reports about itself
#[tracing::instrument(skip(runtime, client_options))]
pub async fn status<R: Runtime>(runtime: R, client_options: ClientOptions) -> Result<()> {
    let client = build_client(runtime, client_options)?;
    run(&client, &mut std::io::stdout()).await
}

pub(crate) async fn run<P: Predictor, W: Write>(predictor: &P, out: &mut W) -> Result<()> {
    let status = predictor
        .service_status()
        .await
        .with_context(|| format!("Failed to query {}", predictor.base_url()))?;

    writeln!(out, "api:          {}", predictor.base_url())?;
    writeln!(out, "status:       {}", status.status)?;
    writeln!(out, "message:      {}", status.message)?;
    writeln!(
        out,
        "model loaded: {}",
        if status.model_loaded { "yes" } else { "no" }
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockPredictor, ServiceStatus};
    use crate::error::ClientError;

    #[tokio::test]
    async fn test_status_prints_fields() {
        let mut predictor = MockPredictor::new();
        predictor
            .expect_base_url()
            .return_const("http://localhost:8000".to_string());
        predictor.expect_service_status().returning(|| {
            Ok(ServiceStatus {
                status: "online".to_string(),
                message: "Eyessistant API está rodando".to_string(),
                model_loaded: true,
            })
        });

        let mut out = Vec::new();
        run(&predictor, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("status:       online"));
        assert!(out.contains("model loaded: yes"));
    }

    #[tokio::test]
    async fn test_status_error() {
        let mut predictor = MockPredictor::new();
        predictor
            .expect_base_url()
            .return_const("http://localhost:8000".to_string());
        predictor.expect_service_status().returning(|| {
            Err(ClientError::InvalidResponse(
                serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            ))
        });

        let err = run(&predictor, &mut Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to query http://localhost:8000"));
    }
}
