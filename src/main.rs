use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use defuse::capture::{CaptureReader, CaptureWriter};
use defuse::defuser::Defuser;
use defuse::settings::Settings;

/// Repairs recorded camera streams where two JPEG frames were delivered
/// fused into one oversized buffer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Capture file to repair (length-prefixed frame records)
    input: Option<PathBuf>,

    /// Where to write the repaired capture (default: INPUT with .fixed)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML settings file overriding the built-in tuning
    #[arg(short, long, env = "DEFUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective tuning as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Emit a frame still pending when the input ends instead of dropping it
    #[arg(long)]
    drain: bool,
}

fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("defuse=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref()).context("loading settings")?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    let input = args.input.context("INPUT is required")?;
    let raw = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let mut reader = CaptureReader::new(raw.into());

    let defuser = Defuser::new(settings.defuser);
    let mut writer = CaptureWriter::new();
    let mut frames_in = 0u64;
    let mut frames_out = 0u64;

    while let Some(frame) = reader
        .next_frame()
        .with_context(|| format!("reading record {frames_in}"))?
    {
        frames_in += 1;
        for out in defuser.process(frame)? {
            writer.push(&out);
            frames_out += 1;
        }
    }

    if args.drain {
        if let Some(frame) = defuser.flush() {
            writer.push(&frame);
            frames_out += 1;
        }
    }

    let out_path = args
        .output
        .unwrap_or_else(|| input.with_extension("fixed"));
    std::fs::write(&out_path, writer.into_bytes())
        .with_context(|| format!("writing {}", out_path.display()))?;

    tracing::info!(
        frames_in,
        frames_out,
        splits = frames_out.saturating_sub(frames_in),
        output = %out_path.display(),
        "capture repaired"
    );
    Ok(())
}
