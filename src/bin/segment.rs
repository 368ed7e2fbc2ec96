//! Run the full segmentation pipeline and print the report as JSON.
//!
//! Reads a JSON array of records (`[{"id": "...", "fields": [["name", value], ...]}, ...]`)
//! or, when no input is given, generates the sample customer dataset.
//!
//! Usage: `segment [records.json] [--config config.toml] [--json-logs]`
//!
//! Log level follows `RUST_LOG` (default `info`). Logs go to stderr, the
//! report to stdout.

use segmentation_rs::{
    analyze_with, sample_customers, select_optimal_k_with, ClusterAnalysisResult, KSelection,
    LabeledRecord, Record, SegmentationConfig,
};
use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::BufReader;
use tracing_subscriber::EnvFilter;

const SAMPLE_SIZE: usize = 200;

#[derive(Serialize)]
struct Report<'a> {
    selection: &'a KSelection,
    analysis: &'a ClusterAnalysisResult,
    records: Vec<LabeledRecord>,
}

struct Args {
    input: Option<String>,
    config: Option<String>,
    json_logs: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        input: None,
        config: None,
        json_logs: false,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(iter.next().ok_or("--config needs a path")?);
            }
            "--json-logs" => args.json_logs = true,
            other if other.starts_with("--") => return Err(format!("unknown flag {}", other)),
            other => {
                if args.input.is_some() {
                    return Err("only one input file may be given".to_string());
                }
                args.input = Some(other.to_string());
            }
        }
    }
    Ok(args)
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_records(path: Option<&str>, seed: u64) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            let records: Vec<Record> = serde_json::from_reader(reader)?;
            tracing::info!(path, count = records.len(), "loaded records");
            Ok(records)
        }
        None => {
            let records = sample_customers(SAMPLE_SIZE, seed)?;
            tracing::info!(count = records.len(), "generated sample customers");
            Ok(records)
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match args.config.as_deref() {
        Some(path) => SegmentationConfig::from_toml_file(path)?,
        None => SegmentationConfig::default(),
    };

    let records = load_records(args.input.as_deref(), config.seed)?;

    let selection = select_optimal_k_with(&records, &config)?;
    if !selection.is_valid() {
        return Err(format!(
            "no cluster count could be evaluated for {} record(s)",
            records.len()
        )
        .into());
    }

    let analysis = analyze_with(&records, selection.optimal_k, &config)?;
    let report = Report {
        selection: &selection,
        analysis: &analysis,
        records: analysis.labeled_records(&records),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Usage: segment [records.json] [--config config.toml] [--json-logs]");
            std::process::exit(2);
        }
    };

    init_logging(args.json_logs);

    if let Err(e) = run(args) {
        tracing::error!(error = %e, "segmentation failed");
        std::process::exit(1);
    }
}
