//! Camera capture module
//!
//! Opens the device on a background thread with nokhwa and hands decoded
//! frames to the pipeline through a single-slot channel, so the consumer
//! always sees a recent frame and never an unbounded backlog.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType, Resolution};
use nokhwa::Camera;

use crate::error::CaptureError;

/// Anything the pipeline can pull frames from
pub trait FrameSource: Send {
    /// Block for at most `timeout` waiting for the next frame
    fn next_frame(&mut self, timeout: Duration) -> Result<RgbImage, CaptureError>;

    /// Release the underlying device; later calls are no-ops
    fn stop(&mut self);
}

/// Information about an available camera
#[derive(Clone, Debug)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
}

/// List cameras the platform backend can see
pub fn list_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .iter()
            .enumerate()
            .map(|(idx, info)| CameraInfo {
                index: idx as u32,
                name: info.human_name().to_string(),
            })
            .collect(),
        Err(e) => {
            log::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

/// Camera capture running on its own thread
pub struct CameraCapture {
    frames: Receiver<Result<RgbImage, CaptureError>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
    frame_count: Arc<AtomicU64>,
}

impl CameraCapture {
    /// Open camera `camera_index` and start capturing
    ///
    /// Blocks until the device is open so that open failures surface here
    /// rather than as a silent stream of timeouts.
    pub fn open(camera_index: u32, width: u32, height: u32) -> Result<Self, CaptureError> {
        let (frame_tx, frames) = crossbeam_channel::bounded(1);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let running = Arc::new(AtomicBool::new(true));
        let frame_count = Arc::new(AtomicU64::new(0));

        let running_clone = running.clone();
        let frame_count_clone = frame_count.clone();

        let thread_handle = std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                Self::capture_thread(
                    camera_index,
                    Resolution::new(width, height),
                    frame_tx,
                    ready_tx,
                    running_clone,
                    frame_count_clone,
                );
            })
            .map_err(|e| CaptureError::Open {
                index: camera_index,
                reason: format!("failed to spawn capture thread: {}", e),
            })?;

        let mut capture = Self {
            frames,
            running,
            thread_handle: Some(thread_handle),
            frame_count,
        };

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(capture),
            Ok(Err(e)) => {
                capture.stop();
                Err(e)
            }
            Err(_) => {
                capture.stop();
                Err(CaptureError::Open {
                    index: camera_index,
                    reason: "capture thread exited during startup".to_string(),
                })
            }
        }
    }

    fn open_camera(camera_index: u32, resolution: Resolution) -> Result<Camera, CaptureError> {
        let index = CameraIndex::Index(camera_index);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::HighestResolution(resolution));

        let mut camera = match Camera::new(index.clone(), requested) {
            Ok(c) => c,
            Err(e) => {
                log::warn!(
                    "Failed to open camera at {}x{}: {:?}",
                    resolution.width(),
                    resolution.height(),
                    e
                );
                let fallback = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
                Camera::new(index, fallback).map_err(|e| CaptureError::Open {
                    index: camera_index,
                    reason: e.to_string(),
                })?
            }
        };

        camera.open_stream().map_err(|e| CaptureError::Open {
            index: camera_index,
            reason: e.to_string(),
        })?;

        log::info!(
            "Camera opened: {} ({}x{})",
            camera.info().human_name(),
            camera.resolution().width(),
            camera.resolution().height()
        );
        Ok(camera)
    }

    fn capture_thread(
        camera_index: u32,
        resolution: Resolution,
        frames: Sender<Result<RgbImage, CaptureError>>,
        ready: Sender<Result<(), CaptureError>>,
        running: Arc<AtomicBool>,
        frame_count: Arc<AtomicU64>,
    ) {
        log::info!("Starting camera capture thread (camera {})", camera_index);

        let mut camera = match Self::open_camera(camera_index, resolution) {
            Ok(c) => {
                let _ = ready.send(Ok(()));
                c
            }
            Err(e) => {
                log::error!("{}", e);
                let _ = ready.send(Err(e));
                return;
            }
        };

        while running.load(Ordering::Acquire) {
            let result = Self::read_frame(&mut camera);
            if result.is_ok() {
                frame_count.fetch_add(1, Ordering::Relaxed);
            }
            if let Err(ref e) = result {
                log::warn!("{}", e);
                std::thread::sleep(Duration::from_millis(10));
            }
            match frames.try_send(result) {
                // Consumer still holds the previous frame; drop this one
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
        }

        if let Err(e) = camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {:?}", e);
        }
        log::info!("Camera capture thread stopped");
    }

    fn read_frame(camera: &mut Camera) -> Result<RgbImage, CaptureError> {
        let buffer = camera.frame().map_err(|e| CaptureError::Frame(e.to_string()))?;
        let resolution = buffer.resolution();
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        RgbImage::from_raw(resolution.width(), resolution.height(), decoded.into_raw())
            .ok_or_else(|| CaptureError::Decode("frame buffer smaller than its resolution".to_string()))
    }

    /// Check if capture is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Frames decoded since the device was opened
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }
}

impl FrameSource for CameraCapture {
    fn next_frame(&mut self, timeout: Duration) -> Result<RgbImage, CaptureError> {
        match self.frames.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CaptureError::Timeout(timeout.as_millis() as u64)),
            Err(RecvTimeoutError::Disconnected) => Err(CaptureError::Disconnected),
        }
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            log::info!("Camera released");
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        FrameSource::stop(self);
    }
}
