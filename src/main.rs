use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use log::{debug, error, info};

use flipbook::app::FlipbookApp;
use flipbook::cli::Args;
use flipbook::config::ViewerConfig;
use flipbook::decode::ImageDecoder;
use flipbook::sequence::list_frames;

fn init_logging(args: &Args) -> anyhow::Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| PathBuf::from("flipbook.log"));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .filter_module("eframe", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("Flipbook starting...");
    debug!("Command-line args: {:?}", args);

    let config = ViewerConfig::from_args(&args);

    // Missing or empty directory: no threads, no window
    let paths = match list_frames(&config.directory, &config.extensions) {
        Ok(paths) => paths,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    let title = format!("Flipbook • {} • {} frames", config.directory.display(), paths.len());
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title)
            .with_inner_size([
                config.thumbnail_box.0 as f32 + 16.0,
                config.thumbnail_box.1 as f32 + 48.0,
            ])
            .with_resizable(true),
        ..Default::default()
    };

    info!(
        "Playing {} at {} fps with {} workers",
        config.directory.display(),
        config.fps,
        config.num_workers
    );

    eframe::run_native(
        "Flipbook",
        native_options,
        Box::new(move |cc| {
            let app = FlipbookApp::new(cc, paths, &config, Arc::new(ImageDecoder))?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    info!("Application exiting");
    Ok(())
}
