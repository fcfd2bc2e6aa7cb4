//! Headless session command.
//!
//! Stands in for a plugin host and an embedded web view: a simulated audio
//! thread feeds a test signal through the processor at real-time block
//! cadence, the poller thread writes its scripts to stdout, and every line
//! read from stdin is handed to the control inbox.

use super::signal::{SignalGenerator, SignalKind};
use anyhow::Context;
use clap::Args;
use rupture_bridge::{BridgeConfig, ControlInbox, PollerThread, PresentationPoller, WriterSurface};
use rupture_core::{Freeverb, RuptureProcessor};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct RunArgs {
    /// Seconds to run (default: until Ctrl+C or stdin closes with --exit-on-eof)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Block size
    #[arg(long, default_value = "256")]
    block_size: usize,

    /// Test signal
    #[arg(long, value_enum, default_value = "pulse")]
    signal: SignalKind,

    /// Bridge configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Restore parameters from a state blob before starting
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write the final parameters to a state blob on exit
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Do not read control messages from stdin
    #[arg(long)]
    no_stdin: bool,

    /// Stop the session when stdin reaches end of file
    #[arg(long, conflicts_with = "no_stdin")]
    exit_on_eof: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    if args.sample_rate == 0 {
        anyhow::bail!("Sample rate must be positive");
    }
    if args.block_size == 0 {
        anyhow::bail!("Block size must be positive");
    }
    let duration = args
        .duration
        .map(|d| {
            Duration::try_from_secs_f64(d).map_err(|_| {
                anyhow::anyhow!("Duration must be a non-negative number of seconds, got {d}")
            })
        })
        .transpose()?;

    let config = match &args.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("loading bridge config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    let sample_rate = args.sample_rate as f32;
    let mut processor = RuptureProcessor::new(Freeverb::new());
    if let Some(path) = &args.state {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading state {}", path.display()))?;
        if processor.load_state(&bytes) {
            tracing::info!(path = %path.display(), "restored parameter state");
        } else {
            tracing::debug!(
                path = %path.display(),
                len = bytes.len(),
                "state blob too short, keeping defaults"
            );
        }
    }
    processor.prepare(sample_rate, args.block_size);

    tracing::info!(
        sample_rate = args.sample_rate,
        block_size = args.block_size,
        signal = ?args.signal,
        poll_rate_hz = config.poll_rate_hz,
        "starting session"
    );

    let handles = processor.handles();
    let poller = PresentationPoller::new(
        handles.clone(),
        WriterSurface::new(std::io::stdout()),
        config,
    );
    let inbox = poller.inbox();
    let poller = PollerThread::spawn(poller)?;
    // Served on the Ready transition so the surface starts from the full state.
    poller.request_refresh();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc::set_handler({
        let running = Arc::clone(&running);
        move || running.store(false, Ordering::SeqCst)
    })?;

    if !args.no_stdin {
        spawn_stdin_reader(inbox, args.exit_on_eof.then(|| Arc::clone(&running)))?;
    }

    let audio = thread::Builder::new()
        .name("rupture-audio".into())
        .spawn({
            let running = Arc::clone(&running);
            let generator = SignalGenerator::new(args.signal, sample_rate);
            let block_size = args.block_size;
            move || simulate_audio(processor, generator, block_size, duration, &running)
        })
        .context("spawning audio thread")?;

    let (mut processor, blocks) = audio
        .join()
        .map_err(|_| anyhow::anyhow!("audio thread panicked"))?;
    running.store(false, Ordering::SeqCst);

    processor.release();
    let failed_pushes = poller.stop();

    tracing::info!(
        blocks,
        published = handles.telemetry.published_count(),
        skipped = handles.telemetry.skipped_count(),
        failed_pushes,
        "session finished"
    );

    if let Some(path) = &args.save_state {
        std::fs::write(path, processor.save_state())
            .with_context(|| format!("writing state {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved parameter state");
    }

    Ok(())
}

/// Process blocks at wall-clock cadence until `running` clears or the
/// duration elapses. Returns the processor and the number of blocks run.
fn simulate_audio(
    mut processor: RuptureProcessor<Freeverb>,
    mut generator: SignalGenerator,
    block_size: usize,
    duration: Option<Duration>,
    running: &AtomicBool,
) -> (RuptureProcessor<Freeverb>, u64) {
    let block_period = Duration::from_secs_f64(block_size as f64 / f64::from(processor.sample_rate()));
    let mut left = vec![0.0f32; block_size];
    let mut right = vec![0.0f32; block_size];

    let start = Instant::now();
    let mut deadline = start;
    let mut blocks = 0u64;

    while running.load(Ordering::SeqCst) {
        if duration.is_some_and(|d| start.elapsed() >= d) {
            break;
        }

        generator.fill(&mut left, &mut right);
        processor.process_block(&mut [&mut left, &mut right]);
        blocks += 1;

        deadline += block_period;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        } else if now - deadline > block_period * 8 {
            tracing::debug!(behind_ms = (now - deadline).as_millis(), "audio simulation fell behind");
            deadline = now;
        }
    }

    (processor, blocks)
}

/// Forward stdin lines to the inbox on a detached thread.
///
/// The thread blocks in `read_line`, so it is never joined. With
/// `stop_on_eof`, end of input ends the session.
fn spawn_stdin_reader(inbox: ControlInbox, stop_on_eof: Option<Arc<AtomicBool>>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("rupture-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if line.trim().is_empty() => {}
                    Ok(line) => {
                        inbox.on_message(&line);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
            tracing::debug!("stdin closed");
            if let Some(running) = stop_on_eof {
                running.store(false, Ordering::SeqCst);
            }
        })
        .context("spawning stdin reader")?;
    Ok(())
}
