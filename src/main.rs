//! Gesture Board - Main Entry Point
//!
//! Opens the camera, runs the frame producer and serves the MJPEG stream
//! until Ctrl-C.

use anyhow::Context;
use gesture_board::camera::{self, CameraCapture, FrameSource};
use gesture_board::stream::{self, FrameLoop, OpenSource, Producer, SharedState};
use gesture_board::telemetry::init_logging;
use gesture_board::tracking::onnx::OnnxHandDetector;
use gesture_board::tracking::{HandDetector, NoDetector};
use gesture_board::{AppConfig, Session};

fn build_detector(config: &AppConfig) -> Box<dyn HandDetector> {
    match OnnxHandDetector::new(&config.model_path, config.detection_confidence) {
        Ok(detector) => Box::new(detector),
        Err(e) => {
            tracing::warn!(error = %e, "Hand detection disabled; frames pass through unchanged");
            Box::new(NoDetector)
        }
    }
}

fn camera_opener(config: &AppConfig) -> OpenSource {
    let (index, (width, height)) = (config.camera_index, config.frame_size());
    Box::new(move || {
        CameraCapture::open(index, width, height).map(|c| Box::new(c) as Box<dyn FrameSource>)
    })
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let _log_guard = init_logging(&config.log)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    tracing::info!(
        camera = config.camera_index,
        width = config.frame_width,
        height = config.frame_height,
        port = config.http_port,
        "Starting Gesture Board"
    );
    for info in camera::list_cameras() {
        tracing::info!(index = info.index, name = %info.name, "Camera available");
    }

    let session = Session::new(&config, build_detector(&config)).context("Invalid control layout")?;
    let shared = SharedState::new().handle();
    let frame_loop = FrameLoop::new(&config, session, camera_opener(&config), shared.clone());
    let mut producer = Producer::spawn(frame_loop).context("Failed to start frame producer")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(async move {
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let mut server = tokio::spawn(stream::run_server(config.http_port, shared, shutdown_rx));

        // The server only returns on its own after a bind or accept failure
        let server_done = tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Shutdown requested");
                false
            }
            result = &mut server => {
                result.context("HTTP server task failed")??;
                true
            }
        };

        // Stopping the producer closes every open stream so the server can drain
        tokio::task::spawn_blocking(move || producer.shutdown())
            .await
            .context("Producer shutdown task failed")?;

        if !server_done {
            let _ = shutdown_tx.send(true);
            server.await.context("HTTP server task failed")??;
        }
        tracing::info!("Shutdown complete");
        Ok::<_, anyhow::Error>(())
    })
}
