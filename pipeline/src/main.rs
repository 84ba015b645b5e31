//! Promoclean CLI - Clean promotional-offer datasets into CSV tables
//!
//! # Main Commands
//!
//! ```bash
//! promoclean run                          # Clean and reconcile ./data into ./data
//! promoclean run --out-dir out --json     # Print the run summary as JSON
//! promoclean clean transcript in.json     # Clean one table to stdout
//! promoclean channels                     # Show recognized offer channels
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use promoclean::{
    clean_customers, clean_offers, clean_transcript, read_file, write_table, ChannelSet,
    PipelineOptions, RawCustomer, RawEvent, RawOffer, TableRow, CUSTOMER_COLUMNS,
    DEFAULT_DATA_DIR, TRANSCRIPT_COLUMNS,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "promoclean")]
#[command(about = "Clean offer, customer and transcript data into reconciled CSV tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: read → clean → reconcile ids → write CSV
    Run {
        /// Directory holding portfolio.json, profile.json and transcript.json
        #[arg(long, env = "PROMOCLEAN_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        /// Output directory (default: the data directory)
        #[arg(long, env = "PROMOCLEAN_OUT_DIR")]
        out_dir: Option<PathBuf>,

        /// Comma-separated offer channels (default: web,email,mobile,social)
        #[arg(long)]
        channels: Option<String>,

        /// Also write dense id mappings to this directory
        #[arg(long)]
        mappings_dir: Option<PathBuf>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Clean a single table without reconciling ids
    Clean {
        /// Which table the input holds
        #[arg(value_enum)]
        table: Table,

        /// Input newline-delimited JSON file
        input: PathBuf,

        /// Comma-separated offer channels (offers only)
        #[arg(long)]
        channels: Option<String>,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the recognized offer channels
    Channels,
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Offers,
    Customers,
    Transcript,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            data_dir,
            out_dir,
            channels,
            mappings_dir,
            json,
        } => cmd_run(&data_dir, out_dir.as_deref(), channels.as_deref(), mappings_dir, json),

        Commands::Clean {
            table,
            input,
            channels,
            output,
        } => cmd_clean(table, &input, channels.as_deref(), output.as_deref()),

        Commands::Channels => cmd_channels(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_channels(channels: Option<&str>) -> ChannelSet {
    channels.map(ChannelSet::from_list).unwrap_or_default()
}

fn cmd_run(
    data_dir: &Path,
    out_dir: Option<&Path>,
    channels: Option<&str>,
    mappings_dir: Option<PathBuf>,
    json: bool,
) -> CmdResult {
    let out_dir = out_dir.unwrap_or(data_dir);
    eprintln!("📂 Data: {}", data_dir.display());
    eprintln!("   Output: {}", out_dir.display());

    let channels = parse_channels(channels);
    eprintln!("   Channels: {}", channels.names().join(", "));

    let options = PipelineOptions::from_dirs(data_dir, out_dir)
        .with_channels(channels)
        .with_mappings_dir(mappings_dir);

    let summary = promoclean::run(&options)?;

    eprintln!("\n✅ Done");
    eprintln!("   Offers: {} ({} ids)", summary.offers, summary.distinct_offer_ids);
    eprintln!("   Customers: {} ({} ids)", summary.customers, summary.distinct_customer_ids);
    eprintln!("   Events: {}", summary.events);
    if summary.unmapped_offer_refs + summary.unmapped_customer_refs > 0 {
        eprintln!(
            "   ⚠️  Unmatched references: {} offers, {} customers",
            summary.unmapped_offer_refs, summary.unmapped_customer_refs
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn cmd_clean(
    table: Table,
    input: &Path,
    channels: Option<&str>,
    output: Option<&Path>,
) -> CmdResult {
    eprintln!("📄 Cleaning: {}", input.display());

    let sink = open_output(output)?;
    let rows = match table {
        Table::Offers => {
            let channels = parse_channels(channels);
            let raw = read_file::<RawOffer>(input)?;
            eprintln!("   Encoding: {}", raw.encoding);
            let offers = clean_offers(raw.records, &channels);
            let header = promoclean::offer_columns(&channels);
            write_table(sink, header.as_slice(), offers.iter().map(TableRow::record))?
        }
        Table::Customers => {
            let raw = read_file::<RawCustomer>(input)?;
            eprintln!("   Encoding: {}", raw.encoding);
            let customers = clean_customers(raw.records)?;
            write_table(sink, &CUSTOMER_COLUMNS, customers.iter().map(TableRow::record))?
        }
        Table::Transcript => {
            let raw = read_file::<RawEvent>(input)?;
            eprintln!("   Encoding: {}", raw.encoding);
            let events = clean_transcript(raw.records)?;
            write_table(sink, &TRANSCRIPT_COLUMNS, events.iter().map(TableRow::record))?
        }
    };

    eprintln!("✅ Wrote {} rows", rows);
    if let Some(path) = output {
        eprintln!("   💾 Saved to: {}", path.display());
    }
    Ok(())
}

fn cmd_channels() -> CmdResult {
    for name in ChannelSet::default().names() {
        println!("{}", name);
    }
    Ok(())
}

fn open_output(output: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Ok(Box::new(fs::File::create(path)?))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
