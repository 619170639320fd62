use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use propeller2_asm::{assemble, AsmOptions, PtrSyntax, Source};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble Propeller 2 source into a hub image")]
struct Opts {
    /// Options file (JSON, same fields as the flags below)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Use the v33 pointer index rules
    #[arg(long)]
    v33: bool,
    /// Treat a missing FILE resource as a warning
    #[arg(long)]
    allow_missing_files: bool,
    /// Listing in the classic `line org [opcode] source` layout
    #[arg(long)]
    compat: bool,
    /// Extra directory searched by FILE
    #[arg(short = 'I', value_name = "DIR")]
    include: Option<PathBuf>,
    /// Write the hub image here
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Write the listing here instead of stdout
    #[arg(long, value_name = "FILE")]
    listing: Option<PathBuf>,
    /// Append the symbol table to a text listing
    #[arg(long)]
    symbols: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
}

fn load_options(opts: &Opts) -> Result<AsmOptions> {
    let mut options = match &opts.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            AsmOptions::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => AsmOptions::default(),
    };
    if opts.v33 {
        options.ptr_syntax = PtrSyntax::V33;
    }
    if opts.allow_missing_files {
        options.error_on_missing_file = false;
    }
    if opts.compat {
        options.listing_compat = true;
    }
    if let Some(dir) = &opts.include {
        options.include_dir = Some(dir.clone());
    }
    Ok(options)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let options = load_options(&opts)?;
    let assembly = assemble(Source::Path(opts.input.clone()), &options)?;

    let report = match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&assembly.listing)?,
        OutputFormat::Text => {
            let mut text = assembly.listing.render(options.listing_compat);
            if opts.symbols {
                text.push_str(&assembly.listing.render_symbols());
            }
            text
        }
    };
    match &opts.listing {
        Some(path) => fs::write(path, report).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{report}"),
    }
    if let Some(path) = &opts.output {
        fs::write(path, assembly.image.bytes()).with_context(|| format!("writing {}", path.display()))?;
    }

    let errors = assembly.listing.error_count();
    info!(bytes = assembly.image.len(), errors, elapsed = ?assembly.elapsed, "done");
    anyhow::ensure!(errors == 0, "{errors} error(s) in {}", opts.input.display());
    Ok(())
}
