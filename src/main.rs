#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use tracing_subscriber::prelude::*;

fn init_logging() {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "", "uiforge") {
        let log_dir = proj_dirs.data_dir().join("logs");
        let _ = std::fs::create_dir_all(&log_dir);

        let log_path = log_dir.join("uiforge.log");

        let file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&log_path)
            .expect("Failed to open log file");

        // Owner read/write only - the log can carry prompt text
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = file.metadata() {
                let mut perms = metadata.permissions();
                perms.set_mode(0o600);
                if let Err(e) = std::fs::set_permissions(&log_path, perms) {
                    eprintln!("Failed to set log file permissions: {}", e);
                }
            }
        }

        let filter = tracing_subscriber::EnvFilter::builder()
            .parse(uiforge::DEFAULT_LOG_FILTER)
            .expect("Failed to parse env filter");

        let (filter, reload_handle) = tracing_subscriber::reload::Layer::new(filter);

        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_writer(move || file.try_clone().expect("Failed to clone file handle"))
                .with_ansi(false), // No ANSI colors in file
        );

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");

        // Bridge log crate events to tracing (for eframe, egui, wry, etc.)
        // This must be done AFTER setting the tracing subscriber
        tracing_log::LogTracer::init().expect("Failed to initialize log-to-tracing bridge");

        // Store reload handle so the debug toggle can raise verbosity (in lib.rs)
        uiforge::set_tracing_reload_handle(reload_handle);

        tracing::info!("Logging initialized to: {:?}", log_path);
    }
}

fn setup_panic_handler() {
    // Write panic info to a crash log even if normal logging never came up
    std::panic::set_hook(Box::new(|panic_info| {
        let crash_msg = format!(
            "UI Forge crashed!\n\
             Panic occurred at: {}\n\
             Details: {}\n\
             Backtrace:\n{:?}\n",
            panic_info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "unknown location".to_string()),
            panic_info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info
                    .payload()
                    .downcast_ref::<String>()
                    .map(|s| s.as_str()))
                .unwrap_or("unknown panic"),
            std::backtrace::Backtrace::force_capture()
        );

        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "", "uiforge") {
            let log_dir = proj_dirs.data_dir().join("logs");
            let _ = std::fs::create_dir_all(&log_dir);
            let crash_log_path = log_dir.join("crash.log");

            if let Ok(mut file) = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&crash_log_path)
            {
                use std::io::Write;
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "\n=== CRASH at {} ===\n{}", timestamp, crash_msg);
            }

            eprintln!("\n{}", crash_msg);
            eprintln!("Crash log written to: {:?}", crash_log_path);
        } else {
            eprintln!("\n{}", crash_msg);
        }
    }));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Panic handler first so even startup crashes land in crash.log
    setup_panic_handler();

    let args: Vec<String> = std::env::args().collect();

    init_logging();

    tracing::info!("uiforge starting, args: {:?}", args);

    // Preview child process: render the handed-over document and nothing else
    if let Some((content, title)) = uiforge::app::webview::parse_webview_args(&args) {
        tracing::info!("Webview args detected, entering preview mode");
        uiforge::app::webview::run_webview(content, title)?;
        return Ok(());
    }

    tracing::info!("No webview args, starting normal GUI mode");

    // Initialize V8 platform (required for script-mode rendering)
    uiforge::app::script_runtime::initialize_v8_platform()
        .expect("Failed to initialize V8 platform");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1080.0, 760.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "UI Forge",
        native_options,
        Box::new(|cc| Ok(Box::new(uiforge::ForgeApp::new(cc)))),
    )?;

    Ok(())
}
