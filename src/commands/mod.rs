use anyhow::Result;
use std::time::Duration;

use crate::{api::InferenceClient, config::Config, runtime::Runtime};

mod health;
mod predict;
mod status;

pub use health::health;
pub use predict::{PredictOptions, predict};
pub use status::status;

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOptions {
    pub api_url: Option<String>,
    pub timeout: Option<Duration>,
}

fn build_client<R: Runtime>(runtime: R, options: ClientOptions) -> Result<InferenceClient<R>> {
    let mut config = Config::new(runtime, options.api_url);
    if let Some(timeout) = options.timeout {
        config = config.with_timeout(timeout);
    }
    config.into_client()
}
