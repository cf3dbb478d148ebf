use std::{f32::consts::PI, path::PathBuf, thread};

use bar_spectrum_core::{EngineConfig, SpectrumEngine};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: usize = 48;

fn main() -> bar_spectrum_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::live_defaults(),
    };

    match cli.command {
        Commands::Tone {
            frequency,
            amplitude,
            block,
            frames,
        } => run_tone(&config, frequency, amplitude, block, frames),
        Commands::Layout => run_layout(&config),
    }
}

fn run_tone(
    config: &EngineConfig,
    frequency: f32,
    amplitude: f32,
    block: usize,
    frames: usize,
) -> bar_spectrum_core::Result<()> {
    tracing::info!(frequency, amplitude, block, frames, "feeding synthetic tone");

    let mut engine = SpectrumEngine::from_config(config)?;
    let mut reader = engine
        .take_reader()
        .ok_or_else(|| std::io::Error::other("spectrum reader already taken"))?;

    let sample_rate = config.sample_rate as f32;
    let mut chunk = vec![0.0_f32; block.max(1)];
    let mut position = 0_usize;
    for _ in 0..frames {
        for sample in chunk.iter_mut() {
            let t = position as f32 / sample_rate;
            *sample = amplitude * (2.0 * PI * frequency * t).sin();
            position += 1;
        }
        engine.process(&chunk);
    }

    // Read from a separate thread the way a renderer would.
    let render = thread::spawn(move || {
        let frame = reader.read();
        (
            frame.frame_index(),
            frame.magnitudes().to_vec(),
            frame.peaks().to_vec(),
        )
    });
    let (frame_index, magnitudes, peaks) = render
        .join()
        .map_err(|_| std::io::Error::other("render thread panicked"))?;

    tracing::info!(frame_index, bars = magnitudes.len(), "rendering last frame");
    let layout = engine.layout();
    for (bar, (magnitude, peak)) in magnitudes.iter().zip(&peaks).enumerate() {
        let (low, high) = layout.frequency_range_hz(bar).unwrap_or_default();
        println!(
            "{:>8.0}-{:<8.0} |{}| {magnitude:.3} (peak {peak:.3})",
            low,
            high,
            draw_bar(*magnitude, *peak)
        );
    }

    Ok(())
}

fn run_layout(config: &EngineConfig) -> bar_spectrum_core::Result<()> {
    let engine = SpectrumEngine::from_config(config)?;
    let layout = engine.layout();
    tracing::info!(fft_size = engine.fft_size(), bars = layout.len(), "bar layout");

    for (bar, range) in layout.bin_ranges().iter().enumerate() {
        let (low, high) = layout.frequency_range_hz(bar).unwrap_or_default();
        println!(
            "bar {bar:>3}: bins {:>5}..{:<5} {low:>8.1} Hz - {high:>8.1} Hz",
            range.start, range.end
        );
    }

    Ok(())
}

/// Renders one bar as `#` cells with a `|` where the peak marker sits.
/// Values are expected in roughly `[0, 1]`; anything above is clipped.
fn draw_bar(magnitude: f32, peak: f32) -> String {
    let cells = |value: f32| (value.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    let filled = cells(magnitude);
    let marker = cells(peak).min(BAR_WIDTH.saturating_sub(1));

    (0..BAR_WIDTH)
        .map(|cell| {
            if cell < filled {
                '#'
            } else if cell == marker && peak > magnitude {
                '|'
            } else {
                ' '
            }
        })
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Spectrum bar engine harness", long_about = None)]
struct Cli {
    /// Optional JSON engine configuration.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Feed a synthetic sine tone through the engine and print the bars.
    Tone {
        /// Tone frequency in Hz.
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f32,
        /// Peak amplitude of the tone.
        #[arg(short, long, default_value_t = 0.5)]
        amplitude: f32,
        /// Samples per processing call.
        #[arg(short, long, default_value_t = 512)]
        block: usize,
        /// Number of processing calls.
        #[arg(short = 'n', long, default_value_t = 60)]
        frames: usize,
    },
    /// Print the bin and frequency range assigned to every bar.
    Layout,
}
