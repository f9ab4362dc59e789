use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use pcbooth::config::{TemplateSync, sync_with_template};
use pcbooth::host::scene_file::{SceneDef, hierarchy_lines};

#[derive(Parser, Debug)]
#[command(name = "pcbooth", version, about = "PCBooth - virtual photo studio for PCB models.")]
struct Cli {
    /// Scene description JSON.
    #[arg(long, required_unless_present_any = ["reset_config", "update_config"])]
    scene: Option<PathBuf>,

    /// Configuration JSON with a `default` object and optional presets.
    #[arg(short, long, default_value = "pcbooth.json")]
    config: PathBuf,

    /// Preset merged over `default`.
    #[arg(short, long)]
    preset: Option<String>,

    /// Name of the board object of PCB models.
    #[arg(long, default_value = "PCB")]
    board_name: String,

    /// Overrides SETTINGS.RENDER_DIR.
    #[arg(long)]
    render_dir: Option<PathBuf>,

    /// Overrides SETTINGS.ANIMATION_DIR.
    #[arg(long)]
    animation_dir: Option<PathBuf>,

    /// Print debug logs.
    #[arg(short, long, visible_alias = "verbose")]
    debug: bool,

    /// Print the scene object hierarchy and exit.
    #[arg(short, long)]
    list_objects: bool,

    /// Reset the config file to the bundled template values and exit. Custom presets are kept.
    #[arg(short = 'R', long, conflicts_with = "update_config")]
    reset_config: bool,

    /// Add keys missing from the config file out of the bundled template and exit.
    #[arg(short, long)]
    update_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let sync = match (cli.reset_config, cli.update_config) {
        (true, _) => Some(TemplateSync::Reset),
        (_, true) => Some(TemplateSync::Update),
        _ => None,
    };
    if let Some(mode) = sync {
        sync_with_template(&cli.config, mode)
            .with_context(|| format!("sync config '{}' with template", cli.config.display()))?;
        return Ok(true);
    }
    let scene_path = cli.scene.context("--scene is required")?;

    if cli.list_objects {
        let scene = SceneDef::load(&scene_path)?;
        for line in hierarchy_lines(&scene) {
            println!("{line}");
        }
        return Ok(true);
    }

    let mut config = pcbooth::Config::load(&cli.config, cli.preset.as_deref())
        .with_context(|| format!("load config '{}'", cli.config.display()))?;
    if let Some(dir) = cli.render_dir {
        config.settings.render_dir = dir;
    }
    if let Some(dir) = cli.animation_dir {
        config.settings.animation_dir = dir;
    }
    if !pcbooth::encode::is_ffmpeg_on_path() {
        tracing::warn!("ffmpeg was not found on PATH, video outputs will fail");
    }

    let mut host = pcbooth::MemoryHost::load(&scene_path)
        .with_context(|| format!("load scene '{}'", scene_path.display()))?;
    let report = pcbooth::run(
        &mut host,
        &config,
        &cli.board_name,
        Box::new(pcbooth::FfmpegRunner),
    )?;

    tracing::info!(
        "finished {} jobs: {} outputs, {} failures",
        report.completed.len(),
        report.outputs(),
        report.failures()
    );
    for (job, error) in &report.aborted {
        tracing::error!("{job} did not finish: {error}");
    }
    Ok(report.aborted.is_empty())
}
