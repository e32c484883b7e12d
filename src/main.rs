use anyhow::Result;
use clap::Parser;
use eyessistant::commands::{self, ClientOptions, PredictOptions};
use std::time::Duration;

/// eyessistant - cataract screening client
///
/// Sends an eye photo to the Eyessistant inference API and prints whether
/// signs of cataract were found.
///
/// The API location defaults to the hosted service and can be changed with
/// --api-url or the EYESSISTANT_API_URL environment variable.
///
/// Examples:
///   eyessistant predict eye.jpg     # Classify a local photo
///   eyessistant health              # Check that the API is reachable
#[derive(Parser, Debug)]
#[command(author, version = env!("EYESSISTANT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Inference API base URL (also via EYESSISTANT_API_URL)
    #[arg(
        long = "api-url",
        env = "EYESSISTANT_API_URL",
        value_name = "URL",
        global = true
    )]
    pub api_url: Option<String>,

    /// Request timeout in seconds (at least 1)
    #[arg(
        long,
        value_name = "SECS",
        global = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Classify an eye image
    Predict(PredictArgs),

    /// Check whether the inference API is reachable
    Health(HealthArgs),

    /// Show the service status reported by the inference API
    Status,
}

#[derive(clap::Args, Debug)]
pub struct PredictArgs {
    /// Path, file:// URI, data: URI or http(s) URL of the image
    #[arg(value_name = "IMAGE")]
    pub image: String,

    /// Total number of attempts, including the first request (at least 1)
    #[arg(
        long,
        short = 'n',
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub attempts: Option<u64>,

    /// Upload the file as multipart form data instead of base64 JSON
    #[arg(long)]
    pub upload: bool,

    /// Print the raw prediction as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Also print the health report returned by the API
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = eyessistant::runtime::RealRuntime;

    let client_options = ClientOptions {
        api_url: cli.api_url,
        timeout: cli.timeout.map(Duration::from_secs),
    };

    match cli.command {
        Commands::Predict(args) => {
            let options = PredictOptions {
                attempts: args
                    .attempts
                    .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
                upload: args.upload,
                json: args.json,
            };
            commands::predict(runtime, &args.image, options, client_options).await?
        }
        Commands::Health(args) => commands::health(runtime, args.verbose, client_options).await?,
        Commands::Status => commands::status(runtime, client_options).await?,
    }
    Ok(())
}
