//! Markup preview windows.
//!
//! Visual-mode artifacts are shown in a separate process: the binary
//! re-executes itself with `--webview --html <document>` and the child runs a
//! bare tao/wry event loop around the document. The document is served
//! byte-for-byte through a custom `wry://localhost/` protocol - no
//! sanitization and no rewriting; isolation is the child process plus the
//! webview's own origin rules. Preview windows are ephemeral: each render
//! spawns a new one.

use std::env;
use std::process::Command;
use tao::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};
use wry::WebViewBuilder;

/// Fixed initial viewport for previews; content beyond it scrolls.
pub const PREVIEW_WIDTH: f64 = 980.0;
pub const PREVIEW_HEIGHT: f64 = 700.0;

/// Argument vector for a preview child process. The document is passed
/// through untouched - [`parse_webview_args`] must get the exact bytes back.
pub fn build_preview_args(html: &str, title: &str) -> Vec<String> {
    vec![
        "--webview".to_string(),
        "--title".to_string(),
        title.to_string(),
        "--html".to_string(),
        html.to_string(),
    ]
}

/// Spawn a preview window as a child process of the current executable.
pub fn spawn_preview_process(html: &str, title: &str) -> std::io::Result<()> {
    let current_exe = env::current_exe()?;

    Command::new(current_exe)
        .args(build_preview_args(html, title))
        .spawn()?;

    Ok(())
}

/// Recognize preview-mode arguments. Returns `(document, title)` when the
/// process was started as a preview child, `None` for normal GUI startup.
pub fn parse_webview_args(args: &[String]) -> Option<(String, String)> {
    if !args.iter().any(|arg| arg == "--webview") {
        return None;
    }

    let mut title = "UI Forge Preview".to_string();
    let mut html: Option<String> = None;

    for i in 0..args.len() {
        if args[i] == "--title" && i + 1 < args.len() {
            title = args[i + 1].clone();
        } else if args[i] == "--html" && i + 1 < args.len() {
            html = Some(args[i + 1].clone());
        }
    }

    Some((html.unwrap_or_default(), title))
}

/// Run the preview event loop. Never returns while the window is open.
pub fn run_webview(html: String, title: String) -> wry::Result<()> {
    tracing::info!(
        "run_webview called with title='{}', document {} bytes",
        title,
        html.len()
    );

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(&title)
        .with_inner_size(tao::dpi::LogicalSize::new(PREVIEW_WIDTH, PREVIEW_HEIGHT))
        .build(&event_loop)
        .unwrap();

    // Serve the document through a custom protocol so it gets a real origin;
    // that keeps CDN fetches (Tailwind, Font Awesome) working inside the page
    let builder = WebViewBuilder::new()
        .with_custom_protocol("wry".into(), move |_webview_id, request| {
            let uri = request.uri().to_string();

            if uri == "wry://localhost/" || uri == "wry://localhost" {
                wry::http::Response::builder()
                    .header("Content-Type", "text/html")
                    .body(html.as_bytes().to_vec())
                    .unwrap()
                    .map(Into::into)
            } else {
                tracing::debug!("Preview protocol 404: {}", uri);
                wry::http::Response::builder()
                    .status(404)
                    .body(Vec::new())
                    .unwrap()
                    .map(Into::into)
            }
        })
        .with_url("wry://localhost/");

    #[cfg(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "ios",
        target_os = "android"
    ))]
    let _webview = builder.build(&window)?;

    #[cfg(not(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "ios",
        target_os = "android"
    )))]
    let _webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window.default_vbox().unwrap();
        builder.build_gtk(vbox)?
    };

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        if let Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            *control_flow = ControlFlow::Exit;
        }
    });
}
