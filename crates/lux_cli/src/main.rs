use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use lux_core::{load_scene, RenderConfig};
use lux_renderer::{build_photon_map, render, render_photonmap};

/// Render a scene description with photon mapping
#[derive(Parser, Debug)]
#[command(name = "lux", version, about)]
struct Args {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output image; the format follows the extension
    #[arg(long, short = 'o', value_name = "PATH", default_value = "result.png")]
    out: PathBuf,

    /// Also write a preview of the stored photons
    #[arg(long, value_name = "PATH")]
    photonmap: Option<PathBuf>,

    /// Override the base seed of the photon generators
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Trace photons and render on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Render at twice the resolution and box filter down
    #[arg(long)]
    supersampling: bool,
}

impl Args {
    fn apply_to(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.sequential {
            config.parallel = false;
        }
        if self.supersampling {
            config.supersampling = true;
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    log::info!("Starting Lux");

    let (scene, config) = load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    let config = args.apply_to(config);
    log::debug!("{:?}", config);

    let start = Instant::now();
    let photon_map = build_photon_map(&scene, &config);
    log::info!(
        "Photon map: {} photons in {:.2?}",
        photon_map.len(),
        start.elapsed()
    );

    if let Some(path) = &args.photonmap {
        render_photonmap(&scene, &photon_map, &config)
            .save(path)
            .with_context(|| format!("Failed to write photon map preview {}", path.display()))?;
    }

    let image = render(&scene, &photon_map, &config).context("Render failed")?;
    image
        .save(&args.out)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    Ok(())
}
