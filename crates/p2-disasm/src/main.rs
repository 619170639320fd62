use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use p2_disasm::{load_raw_bin, read_u8};
use propeller2_asm::isa::p2::HUB_ADDR0;
use propeller2_asm::{Disassembler, InstructionRecord, PtrSyntax};

#[derive(Parser, Debug)]
#[command(author, version, about = "Propeller 2 disassembler CLI", long_about = None)]
struct Cli {
    /// Hub address the binary is loaded at
    #[arg(long, default_value_t = 0u32)]
    base: u32,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Decode PTRA/PTRB indices with the v33 rules
    #[arg(long, global = true)]
    v33: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments (a raw .bin is a single hub segment)
    Sections,
    /// Disassemble hub bytes [start, end)
    Range {
        /// Start address (hex or dec)
        start: String,
        /// End address (hex or dec, exclusive)
        end: String,
        /// Execution address of the first long (default: start/4 below $400, start above)
        #[arg(long)]
        org: Option<String>,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).or_else(|| s.strip_prefix('$')) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

/// Cog code sits in the first $400 hub bytes and runs at long addresses.
fn default_org(start: u32) -> u32 {
    if start < HUB_ADDR0 {
        start / 4
    } else {
        start
    }
}

fn render_text(records: &[InstructionRecord], show_bytes: bool) -> String {
    let mut buf = String::new();
    for r in records {
        let _ = write!(buf, "{:05x} {} {:05x}: ", r.hub, r.region, r.pc);
        if show_bytes {
            for b in r.bytes() {
                let _ = write!(buf, "{b:02x} ");
            }
            buf.push(' ');
        } else {
            for w in &r.words {
                let _ = write!(buf, "{w:08x} ");
            }
        }
        let _ = writeln!(buf, "{}", r.source);
    }
    buf
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let img = load_raw_bin(Path::new(&cli.input), cli.base, cli.skip, cli.len)?;
    let syntax = if cli.v33 { PtrSyntax::V33 } else { PtrSyntax::Legacy };

    match cli.cmd {
        Command::Sections => {
            println!("{:<10} {:<#12} {:<#12} {:<6} {:<6}", "name", "start", "end", "perms", "kind");
            for s in &img.segments {
                let start = s.base;
                let end = s.base + (s.bytes.len() as u32);
                println!("{:<10} {start:#010x} {end:#010x} {:<6} {:<6}", s.name, s.perms, s.kind);
            }
        }
        Command::Range { start, end, org, show_bytes, out, format } => {
            let start = parse_u32(&start)?;
            let end = parse_u32(&end)?;
            anyhow::ensure!(end >= start, "end must be >= start");
            anyhow::ensure!(start % 4 == 0, "start must be long aligned");
            anyhow::ensure!(read_u8(&img, start).is_some() || start == end, "start {start:#x} is not mapped");
            let org = match org {
                Some(o) => parse_u32(&o)?,
                None => default_org(start),
            };

            let words = img.words(start, end);
            debug!(start, end, org, words = words.len(), "range");
            let mut records: Vec<InstructionRecord> = Disassembler::new(syntax).range(&words, org).collect();
            // hub column shows where the long was loaded from
            for (i, r) in records.iter_mut().enumerate() {
                r.hub = start + 4 * i as u32;
            }
            let buf = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&records)?,
                OutputFormat::Text => render_text(&records, show_bytes),
            };
            if let Some(path) = out {
                std::fs::write(path, buf)?;
            } else {
                print!("{buf}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_u32_hex_and_dec() {
        assert_eq!(parse_u32("0x10").unwrap(), 0x10);
        assert_eq!(parse_u32("$400").unwrap(), 0x400);
        assert_eq!(parse_u32("16").unwrap(), 16);
        assert!(parse_u32("zz").is_err());
    }

    #[test]
    fn cog_ranges_run_at_long_addresses() {
        assert_eq!(default_org(0x20), 8);
        assert_eq!(default_org(0x400), 0x400);
    }

    #[test]
    fn text_rows_show_address_and_source() {
        let records: Vec<InstructionRecord> = Disassembler::default().range(&[0xF604_0202], 0).collect();
        assert_eq!(render_text(&records, false), "00000 COG 00000: f6040202 MOV $001, #$002\n");
        assert_eq!(render_text(&records, true), "00000 COG 00000: 02 02 04 f6  MOV $001, #$002\n");
    }
}
