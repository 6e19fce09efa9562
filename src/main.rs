use std::path::PathBuf;

use clap::Parser;

use homelab_automation::config::loader::{load_or_default, ConfigError};
use homelab_automation::config::validation::validate_config;
use homelab_automation::config::AutomationConfig;
use homelab_automation::npm::{ProxyHostApi, ProxyManagerClient, ProxyManagerError};
use homelab_automation::observability::init_logging;
use homelab_automation::reconcile::{plan, sync_proxy_hosts, DomainIndex};
use homelab_automation::resilience::HttpTimeouts;

#[derive(Parser)]
#[command(name = "npm-sync")]
#[command(about = "Create or update Nginx Proxy Manager proxy hosts for configured services", long_about = None)]
struct Cli {
    /// Nginx Proxy Manager URL (default: http://localhost:81)
    #[arg(long)]
    url: Option<String>,

    /// NPM admin email
    #[arg(long)]
    email: String,

    /// NPM admin password
    #[arg(long)]
    password: String,

    /// Base domain (default: fatunicorns.club)
    #[arg(long)]
    domain: Option<String>,

    /// Force update existing proxy hosts
    #[arg(long)]
    force_update: bool,

    /// TOML file with services and defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show what would be done without changing anything
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply flag overrides.
    fn resolve_config(&self) -> Result<AutomationConfig, ConfigError> {
        let mut config = load_or_default(self.config.as_deref())?;

        if let Some(url) = &self.url {
            config.proxy_manager.url = url.clone();
        }
        if let Some(domain) = &self.domain {
            config.proxy_manager.domain = domain.clone();
        }
        if self.force_update {
            config.proxy_manager.force_update = true;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(&config.observability);

    let npm = &config.proxy_manager;
    tracing::info!(
        url = %npm.url,
        domain = %npm.domain,
        services = config.services.len(),
        force_update = npm.force_update,
        dry_run = cli.dry_run,
        "Configuration loaded"
    );

    let mut client = ProxyManagerClient::new(&npm.url, HttpTimeouts::from(npm))?;

    if cli.dry_run {
        if let Err(e) = client.authenticate(&cli.email, &cli.password).await {
            login_failed(e);
        }
        let index = DomainIndex::from_hosts(&client.list_hosts().await);
        for planned in plan(&config.services, &npm.domain, npm.force_update, &index) {
            println!("{}", planned);
        }
        return Ok(());
    }

    let report = match sync_proxy_hosts(
        &mut client,
        &cli.email,
        &cli.password,
        &config.services,
        &npm.domain,
        npm.force_update,
    )
    .await
    {
        Ok(report) => report,
        Err(e) => login_failed(e),
    };

    for outcome in &report.outcomes {
        println!("{:<40} {}", outcome.fqdn, outcome.outcome);
    }
    println!(
        "All proxy hosts have been processed: {} created, {} updated, {} skipped, {} failed.",
        report.created(),
        report.updated(),
        report.skipped(),
        report.failed()
    );
    if report.has_failures() {
        tracing::warn!(failed = report.failed(), "Some proxy hosts were not applied, see errors above");
    }

    Ok(())
}

fn login_failed(error: ProxyManagerError) -> ! {
    tracing::error!(error = %error, "Login failed");
    std::process::exit(1);
}
