//! Example: Render the waveform of an audio file.
//!
//! Run with:
//!     cargo run --example render_file -- <audio> [output.png] [--gpu]
//!
//! With `--gpu` the tiles are also uploaded to textures and read back,
//! which checks they fit the device's texture limit.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tilewave::gpu::{GpuContext, TileTextures};
use tilewave::{load_audio, WaveConfig, WaveView};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let use_gpu = match args.iter().position(|a| a == "--gpu") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };
    let input = args
        .first()
        .map(PathBuf::from)
        .context("usage: render_file <audio> [output.png] [--gpu]")?;
    let output = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("waveform.png"));

    println!("Loading {}...", input.display());
    let audio = load_audio(&input).with_context(|| format!("decoding {}", input.display()))?;
    println!(
        "  {:.2}s, {} channel(s) at {} Hz",
        audio.duration(),
        audio.channels,
        audio.sample_rate
    );

    let config = match std::env::var("TILEWAVE_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            WaveConfig::from_json(&json)?
        }
        Err(_) => WaveConfig {
            scroll_parent: true,
            ..Default::default()
        },
    };

    let mut view = WaveView::new(config)?;
    view.set_container_width(1200.0);
    view.load_audio_data(audio)?;
    println!("  Drawn at {}px over {} tile(s)", view.width(), view.tiles().len());

    if use_gpu {
        upload(&view)?;
    }

    save(&view, &output)?;
    view.destroy();
    Ok(())
}

fn upload(view: &WaveView) -> anyhow::Result<()> {
    let ctx = GpuContext::new_blocking()?;
    println!(
        "  GPU: {} (max texture {}px)",
        ctx.adapter_info().name,
        ctx.max_texture_dimension()
    );
    let mut textures = TileTextures::new();
    view.upload_tiles(&ctx, &mut textures)?;
    for (i, texture) in textures.textures().iter().enumerate() {
        let image = texture.read_back(&ctx.device, &ctx.queue)?;
        println!("    texture {} -> {:?}", i, image.dimensions());
    }
    Ok(())
}

fn save(view: &WaveView, output: &Path) -> anyhow::Result<()> {
    view.render_image()
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}
