//! Single frame producer feeding every viewer
//!
//! One thread runs capture → detect → interact → composite → encode and
//! broadcasts each encoded part. Viewers only ever receive immutable bytes,
//! so the canvas and interaction state have exactly one writer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use image::RgbImage;

use super::mjpeg::{encode_jpeg, frame_part};
use super::shared::SharedStateHandle;
use crate::camera::FrameSource;
use crate::config::AppConfig;
use crate::error::CaptureError;
use crate::session::Session;
use crate::telemetry::{FrameProfiler, PipelineCounters};

/// Opens the frame source; called at startup and again after an idle release
pub type OpenSource = Box<dyn FnMut() -> Result<Box<dyn FrameSource>, CaptureError> + Send>;

const IDLE_POLL: Duration = Duration::from_millis(50);
const REOPEN_DELAY: Duration = Duration::from_secs(1);
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A frame was processed (and published unless encoding failed)
    Processed,
    /// Capture produced nothing this iteration
    Skipped,
    /// No viewers and no open source
    Idle,
    /// The source could not be opened
    OpenFailed,
}

/// The per-frame loop, driven by [`Producer`] or stepped directly
pub struct FrameLoop {
    session: Session,
    open_source: OpenSource,
    source: Option<Box<dyn FrameSource>>,
    shared: SharedStateHandle,
    capture_timeout: Duration,
    idle_release: Duration,
    jpeg_quality: u8,
    idle_since: Option<Instant>,
    profiler: FrameProfiler,
    last_report: Instant,
}

impl FrameLoop {
    pub fn new(config: &AppConfig, session: Session, open_source: OpenSource, shared: SharedStateHandle) -> Self {
        shared.update_snapshot(|s| s.detector = session.detector_name().to_string());
        Self {
            session,
            open_source,
            source: None,
            shared,
            capture_timeout: Duration::from_millis(config.capture_timeout_ms),
            idle_release: Duration::from_secs(config.idle_release_secs),
            jpeg_quality: config.jpeg_quality,
            idle_since: None,
            profiler: FrameProfiler::new(),
            last_report: Instant::now(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn source_open(&self) -> bool {
        self.source.is_some()
    }

    /// Open the source if it is closed; false if opening failed
    pub fn open(&mut self) -> bool {
        if self.source.is_some() {
            return true;
        }
        match (self.open_source)() {
            Ok(source) => {
                self.source = Some(source);
                self.shared.update_snapshot(|s| s.camera_open = true);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to open frame source");
                false
            }
        }
    }

    /// Run one iteration
    pub fn step(&mut self) -> Step {
        if self.shared.viewer_count() == 0 {
            let since = *self.idle_since.get_or_insert_with(Instant::now);
            if self.source.is_some() && since.elapsed() >= self.idle_release {
                tracing::info!("No viewers, releasing camera");
                self.release();
            }
            if self.source.is_none() {
                return Step::Idle;
            }
        } else {
            self.idle_since = None;
        }

        if !self.open() {
            return Step::OpenFailed;
        }
        let Some(source) = self.source.as_mut() else {
            return Step::OpenFailed;
        };

        match source.next_frame(self.capture_timeout) {
            Ok(raw) => {
                self.process(raw);
                Step::Processed
            }
            Err(e) if e.is_transient() => {
                PipelineCounters::incr(&self.shared.counters().capture_failures);
                tracing::debug!(error = %e, "Capture skipped");
                Step::Skipped
            }
            Err(e) => {
                PipelineCounters::incr(&self.shared.counters().capture_failures);
                tracing::warn!(error = %e, "Frame source lost");
                self.release();
                Step::Skipped
            }
        }
    }

    fn process(&mut self, raw: RgbImage) {
        self.profiler.begin_frame();
        let out = self.session.process(raw);
        let counters = self.shared.counters();

        if !out.hand_detected {
            PipelineCounters::incr(&counters.frames_without_hand);
        }

        match encode_jpeg(&out.image, self.jpeg_quality) {
            Ok(jpeg) => self.shared.publish(frame_part(&jpeg)),
            Err(e) => {
                PipelineCounters::incr(&counters.encode_failures);
                tracing::warn!(error = %e, "Frame not emitted");
            }
        }

        let state = self.session.state();
        self.shared.update_snapshot(|s| s.update_from(state));
        self.report();
    }

    fn report(&mut self) {
        if self.last_report.elapsed() < REPORT_INTERVAL {
            return;
        }
        self.last_report = Instant::now();

        let stats = self.profiler.stats();
        let fps = self.profiler.fps();
        tracing::debug!(
            fps,
            avg_ms = stats.avg_ms,
            p95_ms = stats.p95_ms,
            viewers = self.shared.viewer_count(),
            "Frame stats"
        );
        self.shared.update_snapshot(|s| {
            s.fps = fps;
            s.frame_time_ms = stats.avg_ms;
        });
    }

    /// Release the source if open; safe to call repeatedly
    pub fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
            self.profiler.reset();
            self.shared.update_snapshot(|s| {
                s.camera_open = false;
                s.fps = 0.0;
            });
        }
    }

    /// Loop until `running` clears, then release the source and end all streams
    pub fn run(mut self, running: &AtomicBool) {
        self.open();
        while running.load(Ordering::Acquire) {
            match self.step() {
                Step::Idle => std::thread::sleep(IDLE_POLL),
                Step::OpenFailed => std::thread::sleep(REOPEN_DELAY),
                Step::Processed | Step::Skipped => {}
            }
        }
        self.release();
        self.shared.close();
        tracing::info!("Frame producer stopped");
    }
}

/// Handle to the producer thread
pub struct Producer {
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Producer {
    /// Start the loop on a "frame-producer" thread; the source is opened there
    pub fn spawn(frame_loop: FrameLoop) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let thread_handle = std::thread::Builder::new()
            .name("frame-producer".to_string())
            .spawn(move || frame_loop.run(&running_clone))?;

        Ok(Self {
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the loop and wait for it to release the source
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!("Frame producer panicked");
            }
        }
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
