//! `devinfo`: read the identity of a device on a serial port.
//!
//! Runs the identity query pipeline until interrupted with Ctrl-C, then prints
//! a JSON report of the last identity retrieved. Configuration comes from the
//! environment (see [`config`]).

mod config;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use devinfo_core::DeviceIdentity;
use devinfo_session::{DriveLoop, DriveSummary, SessionDriver};
use devinfo_transport::{AnyTransport, SerialTransport, list_ports};

use crate::config::CliConfig;

/// Printed on exit.
#[derive(Debug, Serialize)]
struct Report {
    device: String,
    completed: bool,
    identity: BTreeMap<String, String>,
    retrieved_at: Option<DateTime<Utc>>,
    summary: DriveSummary,
}

impl Report {
    fn new(device: String, identity: &DeviceIdentity, summary: DriveSummary) -> Self {
        let fields = identity
            .iter()
            .filter_map(|(field, _)| Some((field.to_string(), identity.text(field)?)))
            .collect();

        Self {
            device,
            completed: summary.completed,
            identity: fields,
            retrieved_at: identity.retrieved_at(),
            summary,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CliConfig::from_env().context("invalid configuration")?;
    info!(
        version = devinfo_core::VERSION,
        port = %config.port,
        baud = config.baud_rate,
        "devinfo starting"
    );

    let port = match SerialTransport::open(config.serial()) {
        Ok(port) => port,
        Err(err) => {
            if let Ok(ports) = list_ports() {
                let names: Vec<_> = ports.iter().map(|p| p.name.as_str()).collect();
                warn!(available = ?names, "Set DEVINFO_PORT to one of the available ports");
            }
            return Err(err).with_context(|| format!("failed to open {}", config.port));
        }
    };

    let mut driver = SessionDriver::builder(AnyTransport::from(port))
        .with_config(config.session())
        .build();

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let summary = DriveLoop::new()
        .with_tick_interval(config.tick_interval)
        .run(&mut driver, cancel)
        .await
        .context("session aborted")?;

    info!(ticks = summary.ticks, state = %summary.final_state, "Session finished");

    let report = Report::new(config.port.clone(), driver.identity(), summary);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Interrupted, stopping after the current exchange");
            cancel.cancel();
        }
        Err(err) => warn!(error = %err, "Cannot listen for Ctrl-C"),
    }
}
