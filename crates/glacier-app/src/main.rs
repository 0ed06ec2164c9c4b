//! Headless Glacier shell.
//!
//! Opens a workspace on the given folder (or the current directory), pipes
//! terminal output to stdout, and forwards stdin lines to the embedded
//! shell. Exists to exercise the full backend without a GUI frontend.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tokio::sync::mpsc;

use glacier_app::{AppEvent, Workspace};
use glacier_config::Config;

#[tokio::main]
async fn main() {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let config_path = glacier_config::default_config_path();
    let mut config = match &config_path {
        Some(path) => Config::load(path),
        None => Config::default(),
    };
    if glacier_config::auto_detect(&mut config) {
        if let Some(path) = &config_path {
            if let Err(e) = config.save(path) {
                log::warn!("could not persist detected interpreters: {e}");
            }
        }
    }

    let (mut workspace, mut events) = Workspace::new(config, config_path);
    if let Err(e) = workspace.open_folder(&root) {
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }

    // Drain backend events to stdout.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                AppEvent::Output { text } => {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                AppEvent::TreeChanged { paths } => {
                    log::info!("project tree changed ({} entries)", paths.len());
                }
                AppEvent::SessionStarted { root } => {
                    log::info!("session started in {root}");
                }
                AppEvent::SessionClosed => {
                    log::info!("session closed");
                }
            }
        }
    });

    // Bridge blocking stdin reads onto the runtime through a channel.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(32);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    // Forward every line to the shell; EOF on stdin ends the session.
    while let Some(line) = line_rx.recv().await {
        workspace.send_command(&line);
    }

    let _ = workspace.close_folder();
}
