use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use segprompt_core::geometry::Viewport;
use segprompt_core::io::load_source_image;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = load_source_image(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let viewport = Viewport::default();
    let bytes = std::fs::metadata(&args.file).map(|m| m.len()).unwrap_or(0);

    println!("File:        {}", source.path.display());
    println!("Dimensions:  {}", source.size);
    println!("Pixels:      {}", source.size.pixel_count());
    println!(
        "Canvas:      {} (x{:.3}, y{:.3} per display pixel)",
        viewport,
        source.size.width as f32 / viewport.width as f32,
        source.size.height as f32 / viewport.height as f32
    );
    println!("File size:   {:.1} KB", bytes as f64 / 1024.0);

    Ok(())
}
