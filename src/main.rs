mod cli;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use orgreview::config::Config;
use orgreview::models::Industry;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orgreview", about = "Browse company reviews and interview reports")]
pub struct Args {
    #[arg(long, env = "ORGREVIEW_API_URL", help = "Backend base URL (overrides config)")]
    pub base_url: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Write a JSON-lines journal of API calls")]
    pub journal: bool,

    #[arg(long, help = "Debug output (print HTTP details and settings)")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search organisations by name
    Search {
        name: String,
        #[arg(long, value_parser = parse_industry)]
        industry: Option<Industry>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show an organisation with its latest reviews and interviews
    Org {
        id: i64,
        #[arg(long = "reviews", value_name = "N")]
        review_limit: Option<u32>,
        #[arg(long = "interviews", value_name = "N")]
        interview_limit: Option<u32>,
        #[arg(long)]
        position: Option<String>,
    },
    /// List organisation names
    Names {
        #[arg(long, value_parser = parse_industry)]
        industry: Option<Industry>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
    /// Show an account and its posts
    Account { id: i64 },
    /// Sign in
    Login {
        username: String,
        #[arg(long, env = "ORGREVIEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup {
        username: String,
        #[arg(long, env = "ORGREVIEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the account behind the current session
    Whoami,
    /// Interactive organisation picker
    Pick {
        #[arg(long, value_parser = parse_industry)]
        industry: Option<Industry>,
    },
    /// List industry keys and labels
    Industries,
}

fn parse_industry(s: &str) -> Result<Industry, String> {
    Industry::from_key(s).ok_or_else(|| {
        format!(
            "unknown industry '{}' (run `orgreview industries` for the list)",
            s
        )
    })
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.debug);

    let mut cfg = if let Some(config_path) = &args.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_else(|e| {
            warn!("ignoring config files: {:#}", e);
            Config::default()
        })
    };

    if let Some(base_url) = &args.base_url {
        cfg.api.base_url = Some(base_url.clone());
    }
    if args.journal {
        cfg.journal.enabled = Some(true);
    }

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error {}", error);
        }
        return Err(anyhow!("Invalid configuration ({} errors)", errors.len()));
    }

    debug!("API base URL: {}", cfg.api.base_url());
    debug!("Timeout: {}ms", cfg.api.timeout_ms());
    debug!(
        "Search: max_results={} preload_limit={}",
        cfg.search.max_results(),
        cfg.search.preload_limit()
    );

    let ctx = cli::Context::new(cfg)?;
    cli::run(&ctx, args.command)
}
