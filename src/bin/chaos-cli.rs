use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

/// A request the service answered with a non-2xx status.
#[derive(Debug, Error)]
#[error("service returned status {status}: {body}")]
struct StatusError {
    status: StatusCode,
    body: String,
}

#[derive(Parser)]
#[command(name = "chaos-cli")]
#[command(about = "Runtime control for chaos and scheduler settings", long_about = None)]
struct Cli {
    /// Base URL of the target service
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change a service's chaos configuration
    Chaos {
        #[command(subcommand)]
        action: ChaosAction,
    },
    /// Inspect or change the platform's polling interval
    Scheduler {
        #[command(subcommand)]
        action: SchedulerAction,
    },
}

#[derive(Subcommand)]
enum ChaosAction {
    /// Show the current chaos configuration
    Show,
    /// Update one or both chaos settings
    Set {
        /// Probability in [0, 1] of injecting a 500
        #[arg(long)]
        error_rate: Option<f64>,
        /// Upper bound of injected latency in milliseconds
        #[arg(long)]
        latency_max: Option<i64>,
    },
}

#[derive(Subcommand)]
enum SchedulerAction {
    /// Show the current polling interval
    Show,
    /// Change the polling interval
    Set {
        /// New interval in milliseconds
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Chaos { action: ChaosAction::Show } => {
            client.get(format!("{}/config", cli.url)).send().await?
        }
        Commands::Chaos {
            action: ChaosAction::Set {
                error_rate,
                latency_max,
            },
        } => {
            let mut body = Map::new();
            if let Some(rate) = error_rate {
                body.insert("errorRate".into(), Value::from(rate));
            }
            if let Some(max) = latency_max {
                body.insert("latencyMax".into(), Value::from(max));
            }
            client
                .post(format!("{}/config", cli.url))
                .json(&body)
                .send()
                .await?
        }
        Commands::Scheduler { action: SchedulerAction::Show } => {
            client
                .get(format!("{}/config/scheduler", cli.url))
                .send()
                .await?
        }
        Commands::Scheduler {
            action: SchedulerAction::Set { interval },
        } => {
            client
                .post(format!("{}/config/scheduler", cli.url))
                .json(&serde_json::json!({ "interval": interval }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;
    ensure_success(status, body.clone())?;

    let json: Value = serde_json::from_str(&body)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn ensure_success(status: StatusCode, body: String) -> Result<(), StatusError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(StatusError { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_success_status_is_an_error() {
        assert!(ensure_success(StatusCode::OK, "{}".into()).is_ok());

        let err = ensure_success(StatusCode::BAD_REQUEST, r#"{"error":"Invalid interval"}"#.into())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"service returned status 400 Bad Request: {"error":"Invalid interval"}"#
        );
    }
}
