use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use relaymap::config::{self, RenderConfig};
use relaymap::formatters::{build_dot, build_json, render_png};
use relaymap::scrub::scrub;
use relaymap::stats_parser::parse_stats;
use relaymap::tree;

/// Output format for the rendered map
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// d3-compatible node/link JSON graph
    Json,
    /// Weighted GraphViz DOT graph
    Dot,
    /// PNG rendered through the external GraphViz binary
    Png,
    /// Indented text hierarchy
    Text,
}

/// Topology mapper and renderer for spanning-tree relay networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the stats XML document ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Output file (stdout when omitted; required for png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to the render configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Include servers that matched no naming convention
    #[arg(long)]
    display_all: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut render_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => RenderConfig::default(),
    };
    if args.display_all {
        render_config.display_all = true;
    }

    let document = read_input(&args.input)?;
    let mut records = parse_stats(&document)?;
    if records.is_empty() {
        warn!("stats document contains no servers");
    }

    scrub(&mut records, &render_config.scrub);
    let map = tree::assemble(&records);
    info!("mapped {} of {} servers", map.len(), records.len());

    match args.format {
        Format::Json => {
            let json = build_json(&map, render_config.display_all)?;
            write_output(args.output.as_deref(), json.as_bytes())
        }
        Format::Dot => {
            let dot = build_dot(&map, render_config.display_all);
            write_output(args.output.as_deref(), dot.as_bytes())
        }
        Format::Png => {
            let output = args
                .output
                .as_deref()
                .ok_or_else(|| eyre!("--output is required for png"))?;
            let dot = build_dot(&map, render_config.display_all);
            let png = render_png(&dot, &render_config.dot_binary)?;
            fs::write(output, png)
                .wrap_err_with(|| format!("Failed to write output file {:?}", output))
        }
        Format::Text => {
            let text = tree::render_text(&map);
            write_output(args.output.as_deref(), text.as_bytes())
        }
    }
}

/// Read the stats document from a file, or stdin for "-"
fn read_input(path: &std::path::Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut document = String::new();
        io::stdin()
            .read_to_string(&mut document)
            .wrap_err("Failed to read stats document from stdin")?;
        Ok(document)
    } else {
        fs::read_to_string(path).wrap_err_with(|| format!("Failed to read input file {:?}", path))
    }
}

/// Write rendered output to a file, or stdout when no path was given
fn write_output(path: Option<&std::path::Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes)
            .wrap_err_with(|| format!("Failed to write output file {:?}", path)),
        None => io::stdout()
            .write_all(bytes)
            .wrap_err("Failed to write to stdout"),
    }
}
