use clap::{Parser, Subcommand};
use legalform::config::ConfigLoader;
use legalform::error::{describe_error_code, AppResult, LegalFormError};
use legalform::intake::parse_amount;
use legalform::server::ApiServer;
use legalform::shares::{calculate_distribution, ContributionRecord, ShareDistribution};
use std::path::PathBuf;
use tracing::{debug, error, trace, warn};

/// Company registration intake service
#[derive(Parser)]
#[command(name = "legalform")]
#[command(about = "LegalForm - company registration intake and share distribution", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the configuration
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },
    /// Compute a share distribution
    Shares {
        /// Declared company capital in FCFA; 0 uses the sum of contributions
        #[arg(long, default_value = "0")]
        capital: String,

        /// Associate as `id:cash[:in_kind]`, repeat for each associate
        #[arg(short = 'a', long = "associate", value_parser = parse_associate, required = true)]
        associates: Vec<ContributionRecord>,

        /// Print the distribution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration with secrets masked
    Config {
        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

fn parse_associate(value: &str) -> Result<ContributionRecord, String> {
    let mut parts = value.splitn(3, ':');
    let id = parts.next().unwrap_or_default().trim();
    if id.is_empty() {
        return Err(format!("'{value}' has no associate id, expected id:cash[:in_kind]"));
    }
    let cash = parts
        .next()
        .ok_or_else(|| format!("'{value}' has no cash amount, expected id:cash[:in_kind]"))?;
    let in_kind = parts.next().unwrap_or("0");

    Ok(ContributionRecord::new(
        id,
        parse_amount(cash),
        parse_amount(in_kind),
    ))
}

fn print_distribution(distribution: &ShareDistribution) {
    println!("Capital base: {:.0} FCFA", distribution.capital_base);
    println!("Total contributions: {:.0} FCFA", distribution.total_contributions);
    println!();
    for allocation in &distribution.allocations {
        let range = allocation
            .share_range()
            .map(|r| format!("{} - {}", r.start(), r.end()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<20} {:>12.0} FCFA {:>7.2}% {:>6} shares  [{}]",
            allocation.associate_id,
            allocation.total_contribution,
            allocation.percentage,
            allocation.number_of_shares,
            range
        );
    }
    println!();
    println!("Total shares: {}", distribution.total_shares());

    if let Some(advisory) = &distribution.advisory {
        println!("Warning: {}", advisory);
    }
}

async fn run_serve(verbose: u8, config: Option<PathBuf>, port: Option<u16>) -> AppResult<()> {
    let loaded = ConfigLoader::new().load(config.as_deref()).await;
    init_tracing(verbose, loaded.as_ref().map_or("info", |c| c.log_level.as_str()));
    let mut config = loaded?;
    if let Some(port) = port {
        config.server.port = port;
    }
    debug!("Effective configuration: {:?}", config.redacted());

    ApiServer::from_config(&config)?.start().await
}

fn run_shares(capital: &str, associates: &[ContributionRecord], json: bool) -> AppResult<()> {
    let distribution = calculate_distribution(associates, parse_amount(capital));
    if let Some(advisory) = &distribution.advisory {
        warn!("Capital mismatch: {}", advisory);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&distribution)?);
    } else {
        print_distribution(&distribution);
    }
    Ok(())
}

async fn run_config(config: Option<PathBuf>) -> AppResult<()> {
    let config = ConfigLoader::new().load(config.as_deref()).await?;
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

fn init_tracing(verbose: u8, configured_level: &str) {
    let log_level = match verbose {
        0 => configured_level,
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,tower=debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();

    debug!("LegalForm started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config, port } => run_serve(cli.verbose, config, port).await,
        Commands::Shares {
            capital,
            associates,
            json,
        } => {
            init_tracing(cli.verbose, "info");
            run_shares(&capital, &associates, json)
        }
        Commands::Config { config } => {
            init_tracing(cli.verbose, "warn");
            run_config(config).await
        }
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        let exit_code = match e.downcast_ref::<LegalFormError>() {
            Some(err) => {
                eprintln!("Error: {}", err.user_message());
                eprintln!("  [E{:04}] {}", err.code(), describe_error_code(err.code()));
                err.exit_code()
            }
            None => {
                eprintln!("Error: {e}");
                1
            }
        };
        std::process::exit(exit_code);
    }
}
