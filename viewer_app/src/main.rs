//! Interactive 3D model viewer.
//!
//! Usage: `viewer_app [path/to/model.obj]`
//!
//! Drag with the left mouse button to orbit the model, scroll to scale it,
//! press Escape to quit.

use std::process::ExitCode;

use viewer_engine::{foundation::logging, ViewerApp, ViewerConfig};

const DEFAULT_MODEL: &str = "assets/model.obj";

fn main() -> ExitCode {
    logging::init();

    let model_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let config = ViewerConfig::new(model_path);

    let mut app = match ViewerApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to start viewer: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = app.run() {
        log::error!("Viewer exited with error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
