// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photo_booth::backends::camera::{DeviceSelector, open_source};
use photo_booth::config::Config;
use photo_booth::filters::FilterKind;
use std::path::PathBuf;
use tracing::warn;

mod cli;

#[derive(Parser)]
#[command(name = "photo-booth")]
#[command(about = "Camera photo booth with real-time filters")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive booth in the terminal (default)
    Terminal {
        /// Camera index (from 'photo-booth list') or device path
        #[arg(short, long, value_parser = cli::parse_selector)]
        camera: Option<DeviceSelector>,

        /// Use image files instead of cameras, one device per file
        #[arg(short, long)]
        input: Vec<PathBuf>,
    },

    /// List available cameras
    List {
        /// List image files as devices instead of cameras
        #[arg(short, long)]
        input: Vec<PathBuf>,
    },

    /// Take a photo and save it to the library
    Photo {
        /// Camera index (from 'photo-booth list') or device path
        #[arg(short, long, value_parser = cli::parse_selector)]
        camera: Option<DeviceSelector>,

        /// Use image files instead of cameras, one device per file
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Filter to apply (none, grayscale, sepia, invert, blur, brightness)
        #[arg(short, long)]
        filter: Option<FilterKind>,

        /// Countdown in seconds (default: from config)
        #[arg(short = 't', long)]
        countdown: Option<u32>,

        /// Also export the JPEG to this file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a filter to an image file
    Filter {
        /// Image to read
        input: PathBuf,

        /// Filter to apply (none, grayscale, sepia, invert, blur, brightness)
        #[arg(short, long)]
        filter: FilterKind,

        /// Where to write the filtered image
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Manage saved photos
    Gallery {
        #[command(subcommand)]
        command: GalleryCommands,
    },
}

#[derive(Subcommand)]
enum GalleryCommands {
    /// List saved photos, newest first
    List,

    /// Delete a saved photo
    Delete {
        /// Photo id (from 'photo-booth gallery list')
        id: u64,
    },

    /// Write a saved photo to a file or directory
    Export {
        /// Photo id (from 'photo-booth gallery list')
        id: u64,

        /// Target file or directory
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photo_booth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let updated = match cli.command {
        None => run_terminal(config, None, Vec::new())?,
        Some(Commands::Terminal { camera, input }) => run_terminal(config, camera, input)?,
        Some(Commands::List { input }) => {
            let source = open_source(&input, config.ideal_width, config.ideal_height)?;
            return cli::list_cameras(source);
        }
        Some(Commands::Photo {
            camera,
            input,
            filter,
            countdown,
            output,
        }) => {
            let source = open_source(&input, config.ideal_width, config.ideal_height)?;
            let options = cli::PhotoOptions {
                camera,
                filter,
                countdown,
                output,
            };
            let updated = cli::take_photo(config, source, options)?;
            if !input.is_empty() {
                // Image files are not cameras worth remembering
                return Ok(());
            }
            updated
        }
        Some(Commands::Filter {
            input,
            filter,
            output,
        }) => return cli::filter_file(&input, filter, &output),
        Some(Commands::Gallery { command }) => {
            return match command {
                GalleryCommands::List => cli::gallery_list(&config),
                GalleryCommands::Delete { id } => cli::gallery_delete(config, id),
                GalleryCommands::Export { id, output } => cli::gallery_export(config, id, &output),
            };
        }
    };

    let saved = match &cli.config {
        Some(path) => updated.save_to(path),
        None => updated.save(),
    };
    if let Err(e) = saved {
        warn!(error = %e, "Failed to save config");
    }
    Ok(())
}

fn run_terminal(
    config: Config,
    camera: Option<DeviceSelector>,
    input: Vec<PathBuf>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let source = open_source(&input, config.ideal_width, config.ideal_height)?;
    let remember = input.is_empty();
    let original = config.clone();

    let mut updated = photo_booth::terminal::run(config, source, camera)?;
    if !remember {
        updated.last_camera_path = original.last_camera_path;
    }
    Ok(updated)
}
