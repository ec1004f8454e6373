//! Writes a complete icon set (PNG files, `icon.icns` and `icon.ico`) into a
//! directory.
//!
//! ```shell
//! iconkit icons
//! iconkit --solid dc3232ff --level 0 build/icons
//! ```

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use iconkit::iconset::{self, IconSetLayout};
use iconkit::{Compression, Glyph, PixelSource, SolidColor};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "iconkit", version, about = "Render and package app icons")]
struct Cli {
    /// Directory the icon set is written to (created if missing)
    #[arg(default_value = "icons")]
    out_dir: PathBuf,

    /// Deflate level for every PNG (0 = stored, 10 = slowest)
    #[arg(short, long, default_value_t = Compression::BEST.level())]
    level: u8,

    /// Paint every icon one color instead of the default glyph
    #[arg(long, value_name = "RRGGBBAA", value_parser = parse_rgba)]
    solid: Option<[u8; 4]>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_rgba(input: &str) -> Result<[u8; 4], String> {
    let digits = input.trim_start_matches('#');
    if digits.len() != 8 || !digits.is_ascii() {
        return Err(format!("expected 8 hex digits, got {:?}", input));
    }
    let mut rgba = [0u8; 4];
    for (index, channel) in rgba.iter_mut().enumerate() {
        let pair = &digits[2 * index..2 * index + 2];
        *channel = u8::from_str_radix(pair, 16)
            .map_err(|err| format!("invalid hex digits {:?}: {}", pair, err))?;
    }
    Ok(rgba)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let layout = IconSetLayout {
        compression: Compression::new(cli.level),
        ..IconSetLayout::default()
    };
    let source: Box<dyn PixelSource> = match cli.solid {
        Some(rgba) => Box::new(SolidColor(rgba)),
        None => Box::new(Glyph),
    };
    let artifacts = iconset::generate(source.as_ref(), &layout, &cli.out_dir)
        .with_context(|| {
            format!("failed to write icon set to {}", cli.out_dir.display())
        })?;
    for artifact in &artifacts {
        println!("{} ({} bytes)", artifact.path.display(), artifact.len);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}
