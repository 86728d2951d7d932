use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gbi_core::{BadPointerPolicy, Interpreter, InterpreterConfig, Rdram, RecordingBackend};
use tracing::{info, Level};
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "gbi-dump")]
#[command(version, about = "Interpret a display list from a memory image and print the backend calls", long_about = None)]
struct Cli {
    /// Raw big-endian memory image
    image: PathBuf,

    /// Physical address of the root display list
    #[arg(short, long, value_parser = parse_u32)]
    root: u32,

    /// Preset a segment base, as ID=BASE (repeatable)
    #[arg(short, long = "segment", value_parser = parse_segment)]
    segments: Vec<(u8, u32)>,

    /// Maximum nesting of display list calls
    #[arg(long, default_value_t = 16)]
    stack_depth: usize,

    /// Commands allowed per frame, 0 for no limit
    #[arg(long, default_value_t = 1_000_000)]
    command_limit: usize,

    /// Fail on a bad sub-list pointer instead of skipping it
    #[arg(long)]
    abort_on_bad_pointer: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Decimal, or hex with a `0x` prefix.
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn parse_segment(s: &str) -> Result<(u8, u32), String> {
    let (id, base) = s.split_once('=').ok_or_else(|| format!("expected ID=BASE, got {s:?}"))?;
    let id = parse_u32(id)?;
    if id > 15 {
        return Err(format!("segment id {id} out of range 0..=15"));
    }
    Ok((id as u8, parse_u32(base)?))
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let image = std::fs::read(&cli.image)
        .with_context(|| format!("failed to read {}", cli.image.display()))?;
    info!("loaded {} bytes from {}", image.len(), cli.image.display());
    let ram = Rdram::from_vec(image);

    let mut interp = Interpreter::new(InterpreterConfig {
        call_stack_depth: cli.stack_depth,
        command_limit: (cli.command_limit != 0).then_some(cli.command_limit),
        bad_sub_list: if cli.abort_on_bad_pointer { BadPointerPolicy::Abort } else { BadPointerPolicy::Skip },
    });
    for &(id, base) in &cli.segments {
        interp.set_segment(id, base);
    }

    let mut backend = RecordingBackend::new();
    let result = interp.interpret(&ram, &mut backend, cli.root);

    for call in backend.render_calls() {
        println!("{call:?}");
    }

    let stats = result.context("display list traversal failed")?;
    println!(
        "{} commands, depth {}, {} unknown, {} unsupported, {} rejected, {} unresolved segments, {} bad pointers",
        stats.commands,
        stats.max_depth,
        stats.unknown_opcodes,
        stats.unsupported,
        stats.rejected,
        stats.unresolved_segments,
        stats.malformed_pointers,
    );

    Ok(())
}
