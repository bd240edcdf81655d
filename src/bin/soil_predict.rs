// Soil fertility prediction CLI
//
// Purpose: Validate a soil reading and submit it to the prediction service
// Usage:
//   cargo run --bin soil_predict -- --sample
//   cargo run --bin soil_predict -- N=150 P=45 K=210 pH=6.5 EC=0.45 OC=0.85 \
//       S=12 Zn=1.2 Fe=4.5 Cu=0.8 Mn=2.5 B=0.5
//   cargo run --bin soil_predict -- --check --sample   (validate only)
//   cargo run --bin soil_predict -- --health
//
// Configuration: SOIL_API_URL, SOIL_API_TIMEOUT_MS, RUST_LOG

use soil_fertility_client::{
    validate, ClientConfig, PredictionOutcome, RawReading, ReadingError, ResultReport,
    SoilClient,
};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: soil_predict [--check] [--health] (--sample | KEY=VALUE ...)";

#[derive(Debug, Default)]
struct Args {
    sample: bool,
    check_only: bool,
    health: bool,
    pairs: Vec<String>,
}

fn parse_args<I>(argv: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args::default();
    for arg in argv {
        match arg.as_str() {
            "--sample" => args.sample = true,
            "--check" => args.check_only = true,
            "--health" => args.health = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{}'\n{}", other, USAGE))
            }
            _ => args.pairs.push(arg),
        }
    }
    if !args.health && !args.sample && args.pairs.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(args)
}

/// Start from the sample (when asked) or an empty form, then apply the pairs.
/// `KEY=` blanks that field, so validation reports it as missing.
fn build_reading(args: &Args) -> Result<RawReading, ReadingError> {
    let mut raw = if args.sample {
        RawReading::sample()
    } else {
        RawReading::new()
    };
    raw.apply_pairs(&args.pairs)?;
    Ok(raw)
}

fn usage_error(message: impl std::fmt::Display) -> ExitCode {
    eprintln!("{}\n{}", message, USAGE);
    ExitCode::from(2)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soil_fertility_client=info,soil_predict=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return Ok(ExitCode::from(2));
        }
    };

    let config = ClientConfig::from_env()?;
    tracing::info!("Endpoint: {} (timeout {} ms)", config.endpoint, config.timeout_ms);
    let client = SoilClient::from_config(&config)?;

    if args.health {
        return Ok(match client.health_check().await {
            Ok(status) => {
                println!("{}: {}", status.status, status.message);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Service unreachable: {}", e);
                ExitCode::FAILURE
            }
        });
    }

    let raw = match build_reading(&args) {
        Ok(raw) => raw,
        Err(e) => return Ok(usage_error(e)),
    };

    let reading = match validate(&raw) {
        Ok(reading) => reading,
        Err(e) => {
            eprintln!("{}: {}", e.title(), e.detail());
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.check_only {
        println!("{}\n", reading.grouped_text());
        println!("{}", serde_json::to_string_pretty(&reading)?);
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = client.submit_validated(&reading).await;
    match &outcome {
        PredictionOutcome::Success(result) => {
            let report = ResultReport::new(result, &reading);
            println!("Fertility level: {}", report.fertility_level().display_text());
            println!("{}", report.share_text());
            Ok(ExitCode::SUCCESS)
        }
        PredictionOutcome::DomainFailure { .. } | PredictionOutcome::TransportFailure { .. } => {
            eprintln!("{}: {}", outcome.title(), outcome.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
