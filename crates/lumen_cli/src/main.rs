//! lumen - renders the built-in Cornell box to a PNG.
//!
//! Usage: `lumen [job.json] [-o output.png]`
//!
//! The optional job file holds a `render` and a `scene` section; any field
//! left out keeps its default.

mod cornell;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lumen_render::{render, RenderConfig, SceneConfig};
use serde::Deserialize;

/// Settings read from the optional job file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Job {
    render: RenderConfig,
    scene: SceneConfig,
}

struct Args {
    job: Option<PathBuf>,
    output: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut job = None;
    let mut output = PathBuf::from("cornell.png");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = args
                    .next()
                    .map(PathBuf::from)
                    .context("--output needs a file name")?;
            }
            "-h" | "--help" => {
                println!("usage: lumen [job.json] [-o output.png]");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option '{other}'"),
            other => {
                if job.replace(PathBuf::from(other)).is_some() {
                    bail!("only one job file may be given");
                }
            }
        }
    }

    Ok(Args { job, output })
}

fn load_job(path: &Path) -> Result<Job> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read job file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse job file {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = parse_args()?;
    let mut job = match &args.job {
        Some(path) => load_job(path)?,
        None => Job::default(),
    };
    if args.job.is_none() || job.scene.name == SceneConfig::default().name {
        job.scene.name = "cornell".to_string();
    }
    job.render.validate().context("invalid render settings")?;

    let scene = cornell::build(job.scene)?;
    let image = render(&cornell::camera(), &scene, &job.render)?;

    let average = image.average();
    log::info!(
        "Average radiance {:.4} {:.4} {:.4}",
        average.x,
        average.y,
        average.z
    );

    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("image buffer size does not match its resolution")?;
    buffer
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!("Wrote {}", args.output.display());
    Ok(())
}
