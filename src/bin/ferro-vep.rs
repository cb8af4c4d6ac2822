// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-vep CLI
//!
//! Annotate a VCF file with Ensembl VEP consequences and write a CSV report.

use std::path::{Path, PathBuf};

use clap::Parser;
use ferro_vep::cli::{
    default_log_file_name, init_logging, validate_input_exists, validate_output_writable,
    DEFAULT_OUTPUT,
};
use ferro_vep::vcf::{
    open_vcf, INFO_TOTAL_COVERAGE, INFO_TOTAL_READS, INFO_WINDOW_END, INFO_WINDOW_START,
};
use ferro_vep::vep::HttpTransport;
use ferro_vep::{CsvSink, Pipeline, VepClient, VepConfig, VepError};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "ferro-vep")]
#[command(author, version, about = "Annotate VCF variants with Ensembl VEP")]
#[command(long_about = "Annotate each VCF record with its most severe VEP consequence and \
write allele depths, frequencies and variant class to a CSV report.

Records must carry the Platypus INFO fields TC, TR, WS and WE.

Examples:
  ferro-vep -f calls.vcf
  ferro-vep -f calls.vcf.gz -o report.csv -v
  ferro-vep -f calls.vcf --base-url https://grch37.rest.ensembl.org/vep/homo_sapiens/region/")]
struct Cli {
    /// Input VCF file (optionally gzip-compressed)
    #[arg(short = 'f', long = "file")]
    input: PathBuf,

    /// Output CSV file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (default: .ferro-vep.toml, then ~/.config/ferro/vep.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// VEP region endpoint, overriding the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Log file (default: ferro-vep_<timestamp>.log in the current directory)
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_file = if cli.no_log_file {
        None
    } else {
        Some(
            cli.log_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_log_file_name())),
        )
    };

    if let Err(e) = init_logging(cli.verbose, log_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    info!("Started");
    if let Err(e) = run(&cli) {
        error!("{}", e.detailed_message());
        std::process::exit(1);
    }
    info!("Finished");
}

fn run(cli: &Cli) -> Result<(), VepError> {
    let input = validate_input_exists(&cli.input)?;
    let output = validate_output_writable(&cli.output)?;

    let config = VepConfig::load(cli.config.as_deref())?;
    let base_url = cli.base_url.as_deref().unwrap_or(config.base_url());

    let client = VepClient::new(HttpTransport::with_timeout(config.timeout())?)
        .with_base_url(base_url)
        .with_retry(config.retry_policy());
    let pipeline = Pipeline::new(client, config.pipeline_config()?);

    info!("Reading variants from {}", input.display());
    let reader = open_vcf(&input)?;
    warn_missing_info(reader.header(), &input);

    info!("Writing to {}", output.display());
    let mut sink = CsvSink::create(&output)?;

    let summary = pipeline.run(reader.records(), &mut sink)?;
    info!(
        "Processed {}, {} failed to be annotated",
        summary.total, summary.failed
    );
    Ok(())
}

fn warn_missing_info(header: &ferro_vep::vcf::VcfHeader, input: &Path) {
    for key in [
        INFO_TOTAL_COVERAGE,
        INFO_TOTAL_READS,
        INFO_WINDOW_START,
        INFO_WINDOW_END,
    ] {
        if !header.has_info(key) {
            warn!("{} does not declare INFO field {}", input.display(), key);
        }
    }
}
