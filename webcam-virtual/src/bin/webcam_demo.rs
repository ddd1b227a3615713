//! Mounts a webcam widget on the virtual host, takes one snapshot and
//! prints its metadata as JSON.
//!
//! Usage: `webcam-demo [config.json]`

use std::sync::Arc;

use webcam_core::{AcquisitionCoordinator, MediaHost, Webcam, WebcamConfiguration, WebcamError};
use webcam_virtual::VirtualHost;

fn load_config() -> Result<WebcamConfiguration, WebcamError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                WebcamError::ConfigurationFailed(format!("cannot read {}: {}", path, e))
            })?;
            WebcamConfiguration::from_json(&json)
        }
        None => Ok(WebcamConfiguration::default()),
    }
}

fn run() -> Result<(), WebcamError> {
    let config = load_config()?;
    log::info!("capturing {} snapshot", config.screenshot_format);

    let host = VirtualHost::new();
    let mut webcam = Webcam::new(
        config,
        Arc::clone(&host) as Arc<dyn MediaHost>,
        AcquisitionCoordinator::shared(),
    );
    webcam.set_delegate(Arc::new(|error: Option<&WebcamError>| match error {
        None => log::info!("camera ready"),
        Some(e) => log::error!("camera unavailable: {}", e),
    }));

    webcam.mount();
    if let Some(error) = webcam.state().error() {
        return Err(error.clone());
    }

    let props = webcam.render();
    log::debug!("rendered {}", props);
    webcam.bind_video_element(host.mount_video(&props)?);

    let snapshot = webcam
        .capture_snapshot()
        .ok_or_else(|| WebcamError::SurfaceUnavailable("no frame captured".into()))?;
    let json = serde_json::to_string_pretty(&snapshot.metadata)
        .map_err(|e| WebcamError::Unknown(format!("serialize metadata: {}", e)))?;
    println!("{}", json);

    webcam.unmount();
    log::debug!("diagnostics: {:?}", webcam.diagnostics());
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("webcam-demo: {}", e);
        std::process::exit(1);
    }
}
