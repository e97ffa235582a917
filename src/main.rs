//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `storeprobe` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;

use storeprobe::config::{DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_PAGES};
use storeprobe::initialization::init_logger_with;
use storeprobe::{
    analyze_one, discover, list_engines, AnalyzeOptions, Config, DiscoveryFilters,
    DiscoveryRequest, LogFormat, LogLevel, NotifyConfig, SortBy,
};

#[derive(Parser)]
#[command(
    name = "storeprobe",
    about = "Probes e-commerce URLs, fingerprints payment gateways, and discovers stores via multi-engine dork search",
    version
)]
struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "plain", global = true)]
    log_format: LogFormat,

    /// Fixed User-Agent instead of the randomized browser pool
    #[arg(long, global = true)]
    user_agent: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single store URL
    Analyze {
        /// The URL to analyze (https:// is assumed when no scheme is given)
        url: String,

        /// Skip the checkout-subpage gateway probes
        #[arg(long)]
        no_deep_scan: bool,

        /// Skip the account-page auth probe
        #[arg(long)]
        no_auth_check: bool,
    },

    /// Discover stores via multi-engine dork search
    Discover {
        /// Search query; repeatable. Built-in dork templates are used when
        /// none is given
        #[arg(long = "query", value_name = "QUERY")]
        queries: Vec<String>,

        /// Result pages to fetch per engine per query
        #[arg(long, default_value_t = DEFAULT_SEARCH_PAGES)]
        pages: usize,

        /// Maximum number of stores to return
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,

        /// Restrict the search to named engines; repeatable or comma-separated
        #[arg(long = "engine", value_name = "NAME", value_delimiter = ',')]
        engines: Vec<String>,

        /// Only keep stores with at least this many detected gateways
        #[arg(long)]
        min_gateways: Option<usize>,

        /// Require (true) or forbid (false) Cloudflare
        #[arg(long, value_name = "BOOL")]
        cloudflare: Option<bool>,

        /// Require (true) or forbid (false) an authentication flow
        #[arg(long, value_name = "BOOL")]
        auth: Option<bool>,

        /// Require (true) or forbid (false) a CAPTCHA
        #[arg(long, value_name = "BOOL")]
        captcha: Option<bool>,

        /// Require (true) or forbid (false) 3-D Secure / VBV
        #[arg(long, value_name = "BOOL")]
        vbv: Option<bool>,

        /// Only keep stores carrying this gateway (case-insensitive)
        #[arg(long, value_name = "NAME")]
        gateway_type: Option<String>,

        /// Only keep stores with an extracted price near this value
        #[arg(long, value_name = "PRICE")]
        target_price: Option<f64>,

        /// Final ordering of the result set
        #[arg(long, value_enum)]
        sort_by: Option<SortBy>,

        /// Telegram bot token for the summary notification
        #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
        notify_token: Option<String>,

        /// Telegram chat id for the summary notification
        #[arg(long, env = "TELEGRAM_CHAT_ID")]
        notify_chat_id: Option<String>,
    },

    /// List the configured search engines
    Engines,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists) so the
    // notification credentials don't have to be exported manually
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    let mut config = Config {
        user_agent: cli.user_agent.clone(),
        ..Default::default()
    };

    match cli.command {
        Command::Analyze {
            url,
            no_deep_scan,
            no_auth_check,
        } => {
            let options = AnalyzeOptions {
                deep_gateway_scan: !no_deep_scan,
                auth_check: !no_auth_check,
            };
            match analyze_one(&config, &url, &options).await {
                Ok(Some(record)) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    Ok(())
                }
                Ok(None) => {
                    println!("{} is not a real store (or could not be fetched)", url);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("storeprobe error: {:#}", e);
                    process::exit(1);
                }
            }
        }

        Command::Discover {
            queries,
            pages,
            max_results,
            engines,
            min_gateways,
            cloudflare,
            auth,
            captcha,
            vbv,
            gateway_type,
            target_price,
            sort_by,
            notify_token,
            notify_chat_id,
        } => {
            config.notify = match (notify_token, notify_chat_id) {
                (Some(token), Some(chat_id)) => Some(NotifyConfig { token, chat_id }),
                (Some(_), None) | (None, Some(_)) => {
                    eprintln!("Both --notify-token and --notify-chat-id are required for notifications");
                    process::exit(1);
                }
                (None, None) => None,
            };

            let request = DiscoveryRequest {
                queries,
                pages,
                max_results,
                engines,
                filters: DiscoveryFilters {
                    min_gateways,
                    cloudflare,
                    auth,
                    captcha,
                    vbv,
                    gateway_type,
                    target_price,
                },
                sort_by,
            };

            match discover(&config, &request).await {
                Ok(summary) => {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("storeprobe error: {:#}", e);
                    process::exit(1);
                }
            }
        }

        Command::Engines => {
            for name in list_engines() {
                println!("{name}");
            }
            Ok(())
        }
    }
}
