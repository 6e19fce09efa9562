use std::io;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;

use homelab_automation::config::loader::{load_or_default, ConfigError};
use homelab_automation::config::validation::validate_config;
use homelab_automation::config::AutomationConfig;
use homelab_automation::hub::{AssumeYes, HubClient, PromptConfirm, PurgeReport, Purger, StaleFilter};
use homelab_automation::observability::init_logging;
use homelab_automation::resilience::HttpTimeouts;

#[derive(Parser)]
#[command(name = "ha-purge")]
#[command(about = "Remove Home Assistant entities that have not been updated recently", long_about = None)]
struct Cli {
    /// TOML file with hub settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Home Assistant URL
    #[arg(long)]
    url: Option<String>,

    /// Long-lived access token
    #[arg(long, env = "HA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Inactivity threshold in days (default: 90)
    #[arg(long)]
    days: Option<u32>,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    yes: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<AutomationConfig, ConfigError> {
        let mut config = load_or_default(self.config.as_deref())?;

        if let Some(url) = &self.url {
            config.hub.url = url.clone();
        }
        if let Some(token) = &self.token {
            config.hub.token = token.clone();
        }
        if let Some(days) = self.days {
            config.hub.threshold_days = days;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Threshold is fixed at process start.
    let started = Utc::now();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(&config.observability);

    let hub = &config.hub;
    if hub.token.is_empty() {
        return Err("no access token configured (use --token, HA_TOKEN or [hub].token)".into());
    }

    let filter = StaleFilter::days_before(started, hub.threshold_days);
    tracing::info!(
        url = %hub.url,
        threshold = %filter.threshold(),
        "Fetching entities"
    );

    let client = HubClient::new(&hub.url, &hub.token, HttpTimeouts::from(hub))?;
    let purger = Purger::new(&client, filter);
    let mut stdout = io::stdout();

    let report = if cli.yes {
        purger.run(&mut AssumeYes, &mut stdout).await?
    } else {
        purger.run(&mut PromptConfirm::stdio(), &mut stdout).await?
    };

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &PurgeReport) {
    if !report.confirmed {
        return;
    }
    for id in &report.removed {
        println!("Successfully removed entity: {}", id);
    }
    for (id, reason) in &report.failed {
        println!("Failed to remove entity: {}. {}", id, reason);
    }
    if report.deleted_any() {
        println!(
            "{} of {} stale entities removed.",
            report.removed.len(),
            report.stale.len()
        );
    } else {
        println!("No entities were deleted.");
    }
}
