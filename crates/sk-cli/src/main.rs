//! `sketchsync`: convert scene files between the markup, stylesheet and
//! component dialects, or check that one parses.
//!
//! The dialect of each file follows its extension. Set `RUST_LOG=debug` for
//! parse and save details.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sk_editor::{EditorConfig, FsFileStore, save_scene, try_load_scene};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "sketchsync")]
#[command(about = "Convert scenes between markup, stylesheet and component code")]
#[command(version)]
struct Cli {
    /// Editor config (JSON); only the canvas size is used here.
    #[arg(long, global = true, env = "SKETCHSYNC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read `input` and write it to `output` in the output's dialect.
    Convert { input: PathBuf, output: PathBuf },
    /// Parse `file` and report what it contains.
    Check { file: PathBuf },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let mut store = FsFileStore;

    match cli.command {
        Command::Convert { input, output } => {
            let scene = try_load_scene(&store, &input, config.canvas())?;
            save_scene(&mut store, &output, &scene)?;
            log::info!(
                "wrote {} shapes and {} texts to {}",
                scene.shapes().len(),
                scene.texts().len(),
                output.display()
            );
        }
        Command::Check { file } => {
            let scene = try_load_scene(&store, &file, config.canvas())?;
            println!(
                "{}: {} shapes, {} texts, {} groups",
                file.display(),
                scene.shapes().len(),
                scene.texts().len(),
                scene.groups().len()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
