//! Example: Render a waveform from synthetic audio.
//!
//! Generates a stereo swell/noise pair, draws it in bar mode with split
//! channels, moves the cursor to 40% and writes a PNG.
//!
//! Run with:
//!     cargo run --example render_synthetic

use std::path::Path;
use std::sync::Arc;

use tilewave::audio::synth::stereo_fixture;
use tilewave::playback::{ManualClock, SilentSource};
use tilewave::{WaveConfig, WaveView};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Tilewave - Synthetic Audio Example");
    println!("==================================\n");

    let sample_rate: u32 = 44100;
    let duration_secs: f32 = 12.0;

    println!("Generating synthetic stereo audio...");
    println!("  Sample rate: {} Hz", sample_rate);
    println!("  Duration: {} seconds", duration_secs);
    let buffer = stereo_fixture(sample_rate, duration_secs)?;

    let config = WaveConfig {
        height: 96,
        pixel_ratio: 2.0,
        max_canvas_width: 1000,
        min_px_per_sec: 50.0,
        bar_width: Some(2.0),
        bar_radius: 1.0,
        split_channels: true,
        wave_color: "#7c8da6".to_string(),
        progress_color: "#2f4a73".to_string(),
        background_color: Some("#f7f7f2".to_string()),
        ..Default::default()
    };

    let mut view = WaveView::with_clock(
        config,
        Arc::new(ManualClock::new()),
        Box::new(SilentSource::new()),
    )?;
    view.set_container_width(800.0);
    view.load_decoded(Arc::new(buffer))?;
    view.seek_to(0.4)?;

    println!("\nLayout:");
    println!("  Width: {} device px", view.width());
    println!("  Tiles: {}", view.tiles().len());
    for tile in view.tiles().tiles() {
        println!(
            "    #{} offset {} width {} ({:.3}..{:.3})",
            tile.index, tile.offset, tile.width, tile.start, tile.end
        );
    }

    let output_path = Path::new("synthetic_waveform.png");
    view.render_image().save(output_path)?;
    println!("\nWrote {}", output_path.display());

    Ok(())
}
