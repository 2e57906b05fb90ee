//! Frame timing and pipeline counters

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Frame timing statistics
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// Average frame time in milliseconds
    pub avg_ms: f64,
    /// Minimum frame time in milliseconds
    pub min_ms: f64,
    /// Maximum frame time in milliseconds
    pub max_ms: f64,
    /// 50th percentile (median) frame time
    pub p50_ms: f64,
    /// 95th percentile frame time
    pub p95_ms: f64,
    /// Number of samples in the statistics
    pub sample_count: usize,
}

/// Frame profiler for pipeline iterations
///
/// Keeps a rolling window of iteration durations and start times.
pub struct FrameProfiler {
    frame_times: VecDeque<Duration>,
    /// Maximum samples to keep (10 seconds at 30fps)
    max_samples: usize,
    last_frame_start: Option<Instant>,
    frame_starts: VecDeque<Instant>,
}

impl Default for FrameProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameProfiler {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(300),
            max_samples: 300,
            last_frame_start: None,
            frame_starts: VecDeque::with_capacity(300),
        }
    }

    /// Mark the beginning of a pipeline iteration
    pub fn begin_frame(&mut self) {
        self.begin_frame_at(Instant::now());
    }

    fn begin_frame_at(&mut self, now: Instant) {
        if let Some(start) = self.last_frame_start {
            self.frame_times.push_back(now.duration_since(start));
            if self.frame_times.len() > self.max_samples {
                self.frame_times.pop_front();
            }
        }

        self.last_frame_start = Some(now);

        self.frame_starts.push_back(now);
        if self.frame_starts.len() > self.max_samples {
            self.frame_starts.pop_front();
        }
    }

    /// Get frame timing statistics
    pub fn stats(&self) -> FrameStats {
        if self.frame_times.is_empty() {
            return FrameStats::default();
        }

        let mut times: Vec<f64> = self
            .frame_times
            .iter()
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect();
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let sum: f64 = times.iter().sum();

        FrameStats {
            avg_ms: sum / times.len() as f64,
            min_ms: times.first().copied().unwrap_or(0.0),
            max_ms: times.last().copied().unwrap_or(0.0),
            p50_ms: percentile(&times, 0.50),
            p95_ms: percentile(&times, 0.95),
            sample_count: times.len(),
        }
    }

    /// Current FPS from the window of frame start times
    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frame_starts.front(), self.frame_starts.back()) else {
            return 0.0;
        };
        let duration = last.duration_since(*first).as_secs_f64();

        if duration > 0.0 {
            (self.frame_starts.len() - 1) as f64 / duration
        } else {
            0.0
        }
    }

    /// Forget all samples, e.g. after the pipeline was idle
    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.frame_starts.clear();
        self.last_frame_start = None;
    }
}

/// Calculate percentile from sorted array
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p) as usize;
    sorted[idx]
}

/// Monotonic counters for the frame pipeline, readable from any thread
#[derive(Debug, Default)]
pub struct PipelineCounters {
    /// Frames encoded and broadcast
    pub frames_emitted: AtomicU64,
    /// Iterations skipped because capture failed or timed out
    pub capture_failures: AtomicU64,
    /// Frames where the detector failed or found no hand
    pub frames_without_hand: AtomicU64,
    /// Frames dropped because encoding failed
    pub encode_failures: AtomicU64,
}

impl PipelineCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
