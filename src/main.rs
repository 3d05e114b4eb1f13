mod api;
mod i18n;
mod pairing;
mod sales;
mod workspace;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zapseller_core::config::{self, Config};
use zapseller_core::plan::PlanTier;
use zapseller_core::shellexpand;
use zapseller_core::traits::Provider;
use zapseller_memory::{AuditLogger, Store};
use zapseller_providers::GeminiProvider;

use pairing::Pairing;
use sales::{ChatTurn, Salesperson};
use workspace::Workspace;

/// Operator used by one-shot `ask` previews.
const CLI_OPERATOR: &str = "cli@zapseller.local";
const CLI_PASSWORD: &str = "zapseller-cli";

#[derive(Parser)]
#[command(
    name = "zapseller",
    version,
    about = "ZapSeller AI: virtual WhatsApp salesperson preview service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    Start,
    /// Check configuration and provider availability.
    Status,
    /// Preview one salesperson reply for the demo product.
    Ask {
        /// Plan to simulate (free, starter, pro).
        #[arg(short, long, default_value = "starter")]
        plan: String,
        /// The customer message.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_logging(&cfg)?;

    match cli.command {
        Commands::Start => {
            let provider = build_provider(&cfg)?;
            match &provider {
                Some(p) => {
                    if p.is_available().await {
                        info!("provider '{}' ready", p.name());
                    } else {
                        warn!("provider '{}' is not reachable, chat calls will fail", p.name());
                    }
                }
                None => warn!("no API key configured, chat calls will fail"),
            }

            let store = Store::new(&cfg.memory).await?;
            let salesperson = Salesperson::new(
                provider,
                cfg.models.clone(),
                cfg.gemini().map(|g| g.temperature).unwrap_or(0.8),
            )
            .with_audit(AuditLogger::new(store.pool().clone()));

            let state = api::ApiState::new(
                Arc::new(Workspace::with_session_ttl(Duration::from_secs(
                    cfg.api.session_ttl_secs,
                ))),
                Arc::new(salesperson),
                Arc::new(Pairing::new(Duration::from_secs(cfg.pairing.ttl_secs))),
                Some(store),
                &cfg.zapseller.language,
            );

            println!("{} starting...", cfg.zapseller.name);
            api::serve(&cfg.api, state).await?;
        }
        Commands::Status => {
            println!("{} status\n", cfg.zapseller.name);
            println!("Config:   {}", cli.config);
            println!("Data dir: {}", shellexpand(&cfg.zapseller.data_dir));
            println!("Audit db: {}", shellexpand(&cfg.memory.db_path));
            println!("API:      {}:{}", cfg.api.host, cfg.api.port);
            println!();

            match build_provider(&cfg)? {
                Some(p) => {
                    let available = p.is_available().await;
                    println!(
                        "  {}: {}",
                        p.name(),
                        if available { "available" } else { "unreachable" }
                    );
                }
                None => println!("  gemini: {}", i18n::t("provider_missing", "English")),
            }
            println!(
                "  models: flash={} pro={} audio={}",
                cfg.models.flash, cfg.models.pro, cfg.models.audio
            );
        }
        Commands::Ask { plan, message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: zapseller ask [--plan pro] <message>");
            }
            let plan: PlanTier = plan.parse().map_err(anyhow::Error::msg)?;

            let workspace = Workspace::new();
            workspace
                .signup(CLI_OPERATOR, CLI_PASSWORD, CLI_PASSWORD)
                .await?;
            workspace.change_plan(CLI_OPERATOR, plan).await?;

            let salesperson = Salesperson::new(
                build_provider(&cfg)?,
                cfg.models.clone(),
                cfg.gemini().map(|g| g.temperature).unwrap_or(0.8),
            );
            let turn = ChatTurn {
                conversation_id: "cli".to_string(),
                history: vec![zapseller_core::message::ChatMessage::user(message.join(" "))],
                ..Default::default()
            };

            match salesperson.reply(&workspace, CLI_OPERATOR, turn).await {
                Ok(outcome) => {
                    println!("{}", outcome.reply.text);
                    if let Some(order) = outcome.reply.order_confirmed {
                        println!(
                            "\n[order] {} | {} | {}",
                            order.customer_name,
                            order.details,
                            order.strategy.as_str()
                        );
                    }
                }
                Err(e) => {
                    anyhow::bail!("{} ({e})", i18n::user_message(&e, &cfg.zapseller.language));
                }
            }
        }
    }

    Ok(())
}

/// Console output plus a daily rolling file under `{data_dir}/logs`.
fn init_logging(cfg: &Config) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = std::path::PathBuf::from(shellexpand(&cfg.zapseller.data_dir)).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "zapseller.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.zapseller.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

/// Build the configured provider. `None` when no API key is set.
fn build_provider(cfg: &Config) -> anyhow::Result<Option<Arc<dyn Provider>>> {
    match cfg.gemini() {
        Some(gemini) => Ok(Some(Arc::new(GeminiProvider::from_config(gemini)?))),
        None => Ok(None),
    }
}
