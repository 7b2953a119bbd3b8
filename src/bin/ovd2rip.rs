use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ovdrip::error::OvdError;
use ovdrip::output::DEFAULT_OUTPUT_DIR;
use ovdrip::preprocessor::FunctionMatch;
use ovdrip::types::BusNumber;
use ovdrip::{TranspileOptions, Transpiler};

/// OVD register dump to i2crip script converter
#[derive(Parser, Debug)]
#[command(name = "ovd2rip", version, about = "Convert an OVD register dump into i2crip scripts, one per section")]
struct Cli {
    /// Input OVD file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Directory receiving <section>_<index>.txt files (cleared first)
    #[arg(short, long = "output-dir", value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Bus number written in SET-BUS instead of the placeholder
    #[arg(long, value_name = "N")]
    bus: Option<u32>,

    /// Only treat `function` as a whole word when detecting function definitions
    #[arg(long)]
    strict_functions: bool,
}

impl Cli {
    fn options(&self) -> TranspileOptions {
        TranspileOptions {
            output_dir: self.output_dir.clone(),
            bus: self.bus.map_or(BusNumber::Placeholder, BusNumber::Number),
            function_match: if self.strict_functions {
                FunctionMatch::WordBoundary
            } else {
                FunctionMatch::Substring
            },
        }
    }
}

fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn run(cli: &Cli) -> Result<()> {
    println!("Input: {}", resolve(&cli.input).display());
    println!("Output: {}", resolve(&cli.output_dir).display());
    println!();

    let transpiler = Transpiler::new(cli.options());
    let summary = transpiler
        .transpile_file(&cli.input)
        .with_context(|| format!("converting '{}'", cli.input.display()))?;

    for section in &summary.sections {
        println!(
            "  [+] {} ({} lines, {} commented out)",
            section.file_name, section.instructions, section.commented
        );
    }
    if summary.sections.is_empty() {
        println!("  [W] no '@@' section markers found, nothing written");
    }

    println!();
    println!("FINISHED");
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        match err.downcast_ref::<OvdError>() {
            Some(OvdError::OpenSection { path, message }) => {
                println!("Failed to open file: {} ({})", path.display(), message);
            }
            Some(other) => {
                println!("Error: {}", other);
            }
            None => {
                println!("Error: {:#}", err);
            }
        }
        println!("Exiting...");
        process::exit(1);
    }
}
