//! Meter billing CLI
//!
//! ```sh
//! # Run the REST API with the default config (~/.config/meter-billing/config.toml)
//! meter-billing
//! meter-billing serve --config /etc/meter-billing/config.toml --port 9000
//!
//! # Validate config without starting
//! meter-billing serve --check
//!
//! # One-shot commands
//! meter-billing read --detections detections.json
//! meter-billing bill --consumption 250 --utility electricity
//! meter-billing process --detections detections.json --utility gas
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info, warn};

use meter_billing::application::{BillingService, MeterBill};
use meter_billing::config::{default_config_path, AppConfig, ConfigSource};
use meter_billing::domain::{BillResult, Detection, Reading, UtilityType};
use meter_billing::server::{init_tracing, ServerHandle};
use meter_billing::shared::AppResult;

/// Meter photo reading assembly and utility billing.
#[derive(Parser, Debug)]
#[command(
    name = "meter-billing",
    version,
    about = "Turns meter digit detections into readings and utility bills"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, env = "METER_BILLING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the REST API server (default).
    Serve(ServeArgs),
    /// Assemble a reading from a detector dump.
    Read {
        /// JSON file: an array of detections or `{"detections": [...]}`.
        #[arg(short, long)]
        detections: PathBuf,
    },
    /// Calculate a bill for a consumption value.
    Bill {
        #[arg(long, allow_negative_numbers = true)]
        consumption: i64,
        #[arg(short, long, default_value_t = UtilityType::default().to_string())]
        utility: String,
    },
    /// Assemble the reading from a detector dump and bill it.
    Process {
        #[arg(short, long)]
        detections: PathBuf,
        #[arg(short, long, default_value_t = UtilityType::default().to_string())]
        utility: String,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

/// Accepts both the bare detector output and the HTTP request body shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionDump {
    List(Vec<Detection>),
    Wrapped { detections: Vec<Detection> },
}

fn load_detections(path: &Path) -> AppResult<Vec<Detection>> {
    let raw = std::fs::read_to_string(path)?;
    let dump: DetectionDump = serde_json::from_str(&raw)?;
    Ok(match dump {
        DetectionDump::List(d) | DetectionDump::Wrapped { detections: d } => d,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let (mut config, source) = match AppConfig::load_or_default(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            init_tracing(&AppConfig::default());
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match source {
        ConfigSource::File => info!("Configuration loaded from {}", config_path.display()),
        ConfigSource::Defaults => warn!(
            "No config file at {}; using default configuration",
            config_path.display()
        ),
    }

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(config, &config_path, args).await?,
        Command::Read { detections } => {
            let billing = BillingService::new(config.tariffs);
            let reading = billing.assemble_reading(&load_detections(&detections)?);
            print_reading(&reading);
        }
        Command::Bill {
            consumption,
            utility,
        } => {
            let billing = BillingService::new(config.tariffs);
            print_bill(&billing.calculate_bill(consumption, &utility));
        }
        Command::Process {
            detections,
            utility,
        } => {
            let billing = BillingService::new(config.tariffs);
            let result = billing.process(&load_detections(&detections)?, &utility);
            print_meter_bill(&result);
        }
    }

    Ok(())
}

async fn serve(mut config: AppConfig, config_path: &Path, args: ServeArgs) -> AppResult<()> {
    if let Some(port) = args.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    if args.check {
        config.validate()?;
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Log level   : {}", config.logging.level);
        println!("   Currency    : {}", config.tariffs.currency_symbol);
        println!("   Slabs       : {}", config.tariffs.electricity.slabs.len());
        return Ok(());
    }

    let handle = ServerHandle::start(config).await?;
    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}

fn print_reading(reading: &Reading) {
    for d in &reading.detections {
        println!(
            "{:>8.1}  {:<4} {:.2}",
            d.x_center(),
            d.label,
            d.display_confidence()
        );
    }
    println!("Reading: {}", reading.value);
}

fn print_bill(bill: &BillResult) {
    println!("{}", bill.breakdown);
}

fn print_meter_bill(result: &MeterBill) {
    print_reading(&result.reading);
    println!("Consumption: {}", result.consumption);
    print_bill(&result.bill);
}
