use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use xray_lens::types::{CatalogRecord, ImageInput, schema_for};
use xray_lens::{EndpointSettings, GatewayError, Prober, XrayConfig, XrayService, catalog};

const NOT_IDENTIFIED: &str = "Object not identified, try again.";

#[derive(Parser)]
#[command(name = "xray-lens", version, about = "See inside everyday objects")]
struct Cli {
    /// Override the classification endpoint for this run
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Identify the object in an image
    Scan {
        /// Path or `file://` URI
        image: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the classification server answers
    Probe {
        #[arg(long)]
        json: bool,
    },
    /// Show or change the saved endpoint
    Endpoint {
        #[command(subcommand)]
        action: EndpointAction,
    },
    /// List the built-in catalog
    Catalog,
    /// Print the JSON schema of a catalog record
    Schema,
}

#[derive(Subcommand)]
enum EndpointAction {
    Get,
    /// Save a new endpoint, then probe it
    Set { url: String },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn load_settings(config: &XrayConfig, override_endpoint: Option<&str>) -> anyhow::Result<EndpointSettings> {
    if let Some(endpoint) = override_endpoint {
        let settings = EndpointSettings::new(endpoint).context("invalid --endpoint")?;
        tracing::debug!(endpoint = %settings.get(), source = "flag", "Using endpoint");
        return Ok(settings);
    }
    let settings = match config.settings_path() {
        Some(path) => EndpointSettings::load_or_default(&path, &config.endpoint)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => EndpointSettings::new(&config.endpoint).context("invalid XRAY_ENDPOINT")?,
    };
    tracing::debug!(
        endpoint = %settings.get(),
        settings_path = ?settings.settings_path(),
        "Using endpoint"
    );
    Ok(settings)
}

/// What to tell the user when a scan produced no record
fn miss_message(error: Option<&GatewayError>) -> String {
    match error {
        None => NOT_IDENTIFIED.to_string(),
        Some(GatewayError::Decode(_)) => format!("{NOT_IDENTIFIED} The image could not be read."),
        Some(GatewayError::Network(_) | GatewayError::Timeout { .. }) => {
            format!("{NOT_IDENTIFIED} The backend did not answer, run `xray-lens probe`.")
        }
        Some(_) => format!("{NOT_IDENTIFIED} The backend reported an error."),
    }
}

fn print_record(record: &CatalogRecord) {
    println!("{} ({})", record.name, record.id);
    println!("  {}", record.description);
    for component in &record.components {
        println!(
            "  - {} @ ({:.0}%, {:.0}%): {}",
            component.name, component.position.x, component.position.y, component.description
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = XrayConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }

    match cli.command {
        Command::Scan { image, json } => {
            let settings = load_settings(&config, cli.endpoint.as_deref())?;
            let service = XrayService::from_config(&config, settings);
            match service.classify_and_resolve(&ImageInput::from_uri(&image)).await {
                Ok(Some(record)) if json => println!("{}", serde_json::to_string_pretty(&record)?),
                Ok(Some(record)) => print_record(&record),
                Ok(None) => println!("{}", miss_message(None)),
                Err(e) => {
                    tracing::error!(kind = e.kind(), error = %e, image = %image, "Scan failed");
                    println!("{}", miss_message(Some(&e)));
                }
            }
        }
        Command::Probe { json } => {
            let settings = load_settings(&config, cli.endpoint.as_deref())?;
            let outcome = Prober::new(config.probe_timeout())
                .probe(&settings.get())
                .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                for line in outcome.diagnostics() {
                    println!("{line}");
                }
            }
            if !outcome.is_reachable() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Endpoint { action } => {
            let settings = load_settings(&config, None)?;
            match action {
                EndpointAction::Get => println!("{}", settings.get()),
                EndpointAction::Set { url } => {
                    let saved = settings.set(&url)?;
                    tracing::info!(endpoint = %saved, path = ?settings.settings_path(), "Saved endpoint");
                    println!("Saved {saved}");
                    let outcome = Prober::new(config.probe_timeout()).probe(&saved).await;
                    for line in outcome.diagnostics() {
                        println!("{line}");
                    }
                    if !outcome.is_reachable() {
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
        }
        Command::Catalog => {
            for record in catalog::records() {
                print_record(record);
            }
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&schema_for!(CatalogRecord))?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(path: &std::path::Path) -> XrayConfig {
        XrayConfig {
            endpoint: "http://10.0.0.1:8000".into(),
            settings_path: Some(path.to_path_buf()),
            ..XrayConfig::default()
        }
    }

    #[test]
    fn test_flag_overrides_saved_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"endpoint":"http://192.168.1.5:8000"}"#).unwrap();

        let settings = load_settings(&config_with(&path), Some("http://127.0.0.1:9000/")).unwrap();
        assert_eq!(settings.get(), "http://127.0.0.1:9000/predict");

        let settings = load_settings(&config_with(&path), None).unwrap();
        assert_eq!(settings.get(), "http://192.168.1.5:8000/predict");
    }

    #[test]
    fn test_missing_settings_file_uses_configured_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&config_with(&dir.path().join("none.json")), None).unwrap();
        assert_eq!(settings.get(), "http://10.0.0.1:8000/predict");
    }

    #[test]
    fn test_miss_message_tells_failure_from_no_match() {
        assert_eq!(miss_message(None), NOT_IDENTIFIED);

        let unreachable = miss_message(Some(&GatewayError::Network("refused".into())));
        assert!(unreachable.starts_with(NOT_IDENTIFIED));
        assert!(unreachable.contains("xray-lens probe"));

        let timeout = miss_message(Some(&GatewayError::Timeout { duration_ms: 5000 }));
        assert_eq!(timeout, unreachable);

        let unreadable = miss_message(Some(&GatewayError::Decode("bad".into())));
        assert!(unreadable.contains("could not be read"));

        let server = miss_message(Some(&GatewayError::server(500, "boom")));
        assert!(server.contains("reported an error"));
    }
}
