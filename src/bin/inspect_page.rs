//! CLI that inspects an HTML page and prints a JSON report to stdout.
//!
//! Usage: `inspect_page [--url URL] [--config FILE] [--tables FORMAT --out DIR] [FILE]`
//!
//! Reads HTML from FILE, or stdin when FILE is omitted. Logging goes to
//! stderr and is controlled by `RUST_LOG` (default `warn`).

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use page_inspector::tables::{export_to_dir, ExportFormat};
use page_inspector::{inspect_html, Error, Options, Result};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: inspect_page [--url URL] [--config FILE] [--tables FORMAT --out DIR] [FILE]";

#[derive(Debug, Default)]
struct Args {
    url: Option<String>,
    config: Option<PathBuf>,
    tables: Option<ExportFormat>,
    out: Option<PathBuf>,
    input: Option<PathBuf>,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let missing = |flag: &str| Error::InvalidState(format!("{flag} needs a value\n{USAGE}"));

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--url" => args.url = Some(raw.next().ok_or_else(|| missing("--url"))?),
            "--config" => args.config = Some(raw.next().ok_or_else(|| missing("--config"))?.into()),
            "--tables" => args.tables = Some(raw.next().ok_or_else(|| missing("--tables"))?.parse()?),
            "--out" => args.out = Some(raw.next().ok_or_else(|| missing("--out"))?.into()),
            "-h" | "--help" => return Err(Error::InvalidState(USAGE.to_string())),
            flag if flag.starts_with("--") => {
                return Err(Error::InvalidState(format!("unknown flag {flag}\n{USAGE}")));
            }
            _ => args.input = Some(PathBuf::from(&arg)),
        }
    }

    if args.tables.is_some() && args.out.is_none() {
        return Err(Error::InvalidState(format!("--tables requires --out\n{USAGE}")));
    }
    Ok(args)
}

fn run(args: &Args) -> Result<()> {
    let options = match &args.config {
        Some(path) => Options::from_json(&std::fs::read_to_string(path)?)?,
        None => Options::default(),
    };

    let html = match &args.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let report = inspect_html(&html, args.url.as_deref(), &options)?;

    if let (Some(format), Some(dir)) = (args.tables, &args.out) {
        for table in &report.tables {
            let path = export_to_dir(dir, table, format)?;
            tracing::info!(table = %table.id, path = %path.display(), "table exported");
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let result = parse_args(std::env::args().skip(1)).and_then(|args| run(&args));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
