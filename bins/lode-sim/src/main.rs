//! lode-sim — drive one mining unit through simulated days.
//!
//! Builds a funded pool-based unit on the standard fee schedule, starts
//! mining, advances a manual clock one day at a time and collects on a fixed
//! cadence. Prints every committed event and a final summary.

mod config;
mod sim;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lode_core::constants::COIN;
use lode_unit::{CollectPolicy, UnitEvent};

use crate::config::{OutputFormat, SimConfig};
use crate::sim::Report;

#[derive(Parser)]
#[command(name = "lode-sim")]
#[command(version, about = "Mining unit reward simulator")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a collection scenario and print its settlements.
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit category (0-5)
    #[arg(long)]
    category: Option<u8>,

    /// Number of days to simulate
    #[arg(long)]
    days: Option<u64>,

    /// Collect every N days
    #[arg(long)]
    collect_every: Option<u64>,

    /// Epoch day the simulation starts on
    #[arg(long)]
    start_day: Option<u64>,

    /// Reject collections while mining is off instead of skipping them
    #[arg(long)]
    require_mining: bool,

    /// Output format
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,
}

impl RunArgs {
    /// Resolve file and environment settings, then apply flags on top.
    fn into_config(self) -> Result<SimConfig> {
        let cfg = SimConfig::load(self.config.as_deref())?;
        self.apply(cfg)
    }

    /// Override `cfg` with every flag given, then validate the result.
    fn apply(self, mut cfg: SimConfig) -> Result<SimConfig> {
        if let Some(category) = self.category {
            cfg.category = category;
        }
        if let Some(days) = self.days {
            cfg.days = days;
        }
        if let Some(every) = self.collect_every {
            cfg.collect_every = every;
        }
        if let Some(day) = self.start_day {
            cfg.start_day = day;
        }
        if self.require_mining {
            cfg.collect_policy = CollectPolicy::RequireMining;
        }
        if let Some(output) = self.output {
            cfg.output = output;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Run(args) => {
            let cfg = args.into_config()?;
            let output = cfg.output;
            let report = sim::run(&cfg, |event| print_event(event, output))?;
            print_report(&report, output)
        }
    }
}

fn print_event(event: &UnitEvent, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string(event)?),
        OutputFormat::Text => match event {
            UnitEvent::Settled {
                day,
                payout,
                cumulative_mined_days,
                ..
            } => println!(
                "day {day}: settled {} days, owner {} LODE, referral {} LODE (mined {cumulative_mined_days} days)",
                payout.days,
                format_lode(payout.owner_amount),
                format_lode(payout.referral_amount),
            ),
            UnitEvent::Activated {
                day,
                funded_allocation: Some(allocation),
            } => println!(
                "day {day}: activated, first-year allocation {} LODE",
                format_lode(*allocation)
            ),
            other => println!("day {}: {other:?}", other.day()),
        },
    }
    Ok(())
}

fn print_report(report: &Report, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Text => {
            println!("category:        {}", report.category);
            println!("funded:          {} LODE", format_lode(report.funded));
            println!("paid to owner:   {} LODE", format_lode(report.owner_total));
            println!("paid to referral:{} LODE", format_lode(report.referral_total));
            println!("left in pool:    {} LODE", format_lode(report.remaining));
            println!("days mined:      {}", report.cumulative_mined_days);
            println!("settlements:     {}", report.settlements);
            if report.zero_payouts > 0 {
                println!("zero payouts:    {}", report.zero_payouts);
            }
        }
    }
    Ok(())
}

/// Base units as a decimal LODE amount.
fn format_lode(amount: u64) -> String {
    format!("{}.{:08}", amount / COIN, amount % COIN)
}

/// Initialize the tracing subscriber.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
