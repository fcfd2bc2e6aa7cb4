//! Parameter state blob tooling.

use anyhow::Context;
use clap::{Args, Subcommand};
use rupture_core::{ParamId, ReverbParams, STATE_BLOB_LEN};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct StateArgs {
    #[command(subcommand)]
    command: StateCommand,
}

#[derive(Subcommand)]
enum StateCommand {
    /// Write a state blob from parameter values (unset values use defaults)
    Encode(EncodeArgs),

    /// Print the parameter values stored in a state blob
    Show {
        /// Blob to read
        input: PathBuf,
    },
}

#[derive(Args)]
struct EncodeArgs {
    /// Output file
    output: PathBuf,

    /// Start from an existing blob instead of the defaults
    #[arg(long)]
    from: Option<PathBuf>,

    /// Room size (0-1)
    #[arg(long)]
    room_size: Option<f32>,

    /// Damping (0-1)
    #[arg(long)]
    damping: Option<f32>,

    /// Wet level (0-1)
    #[arg(long)]
    wet_level: Option<f32>,

    /// Dry level (0-1)
    #[arg(long)]
    dry_level: Option<f32>,

    /// Stereo width (0-1)
    #[arg(long)]
    width: Option<f32>,

    /// Freeze mode (0-1, engaged at 0.5 and above)
    #[arg(long)]
    freeze_mode: Option<f32>,
}

impl EncodeArgs {
    fn values(&self) -> [(ParamId, Option<f32>); 6] {
        [
            (ParamId::RoomSize, self.room_size),
            (ParamId::Damping, self.damping),
            (ParamId::WetLevel, self.wet_level),
            (ParamId::DryLevel, self.dry_level),
            (ParamId::Width, self.width),
            (ParamId::FreezeMode, self.freeze_mode),
        ]
    }
}

pub fn run(args: StateArgs) -> anyhow::Result<()> {
    match args.command {
        StateCommand::Encode(encode_args) => encode(&encode_args),
        StateCommand::Show { input } => show(&input),
    }
}

fn encode(args: &EncodeArgs) -> anyhow::Result<()> {
    let params = ReverbParams::new();

    if let Some(path) = &args.from {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading state {}", path.display()))?;
        if !params.deserialize(&bytes) {
            anyhow::bail!(
                "State blob {} is {} bytes; expected at least {}",
                path.display(),
                bytes.len(),
                STATE_BLOB_LEN
            );
        }
    }

    for (id, value) in args.values() {
        let Some(value) = value else { continue };
        if !value.is_finite() {
            anyhow::bail!("{id} must be a finite number, got {value}");
        }
        params.set(id, value);
        let stored = params.get(id);
        if stored != value {
            tracing::warn!(param = %id, requested = value, stored, "value clamped to 0..1");
        }
    }

    std::fs::write(&args.output, params.serialize())
        .with_context(|| format!("writing state {}", args.output.display()))?;

    println!("Wrote {} ({STATE_BLOB_LEN} bytes)", args.output.display());
    print_values(&params);
    Ok(())
}

fn show(path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading state {}", path.display()))?;
    let params = ReverbParams::new();

    println!("State: {} ({} bytes)", path.display(), bytes.len());
    if !params.deserialize(&bytes) {
        println!(
            "Note: blob is shorter than {STATE_BLOB_LEN} bytes and would be ignored; showing defaults"
        );
    } else if bytes.len() > STATE_BLOB_LEN {
        println!(
            "Note: {} trailing bytes ignored",
            bytes.len() - STATE_BLOB_LEN
        );
    }
    print_values(&params);
    Ok(())
}

fn print_values(params: &ReverbParams) {
    println!();
    for id in ParamId::ALL {
        println!("  {:<12} {}", id.key(), params.get(id));
    }
}
