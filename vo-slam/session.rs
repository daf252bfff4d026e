use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use vo_core::FrameInput;

use crate::config::PipelineConfig;
use crate::error::{SlamError, SlamResult};
use crate::pipeline::{CycleReport, Snapshot, VisualOdometry};
use crate::rate::RateMeter;

/// Supplier of frames for a session
pub trait FrameSource {
    /// Next frame, or `None` at end of stream
    fn next_frame(&mut self) -> Option<FrameInput>;

    /// Give back acquisition resources; called once when a run ends
    fn release(&mut self) {}
}

/// Frame source over any iterator of frames
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    frames: I,
    released: bool,
}

impl<I: Iterator<Item = FrameInput>> IterSource<I> {
    pub fn new<T: IntoIterator<IntoIter = I>>(frames: T) -> Self {
        Self { frames: frames.into_iter(), released: false }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl<I: Iterator<Item = FrameInput>> FrameSource for IterSource<I> {
    fn next_frame(&mut self) -> Option<FrameInput> {
        if self.released {
            return None;
        }
        self.frames.next()
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Cross-thread handle for stopping or resetting a running session.
///
/// Requests take effect at the next cycle boundary.
#[derive(Debug, Clone, Default)]
pub struct SessionControl {
    stop: Arc<AtomicBool>,
    reset: Arc<AtomicBool>,
}

impl SessionControl {
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn request_reset(&self) {
        self.reset.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn take_stop(&self) -> bool {
        self.stop.swap(false, Ordering::SeqCst)
    }

    fn take_reset(&self) -> bool {
        self.reset.swap(false, Ordering::SeqCst)
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    EndOfStream,
    StopRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles completed during this run
    pub cycles: u64,
    pub end: RunEnd,
}

/// Frame-driven loop around a pipeline with an explicit run state
#[derive(Debug)]
pub struct Session {
    pipeline: VisualOdometry,
    state: RunState,
    control: SessionControl,
    rate: RateMeter,
}

impl Session {
    pub fn new(cfg: PipelineConfig) -> SlamResult<Self> {
        Ok(Self::with_pipeline(VisualOdometry::new(cfg)?))
    }

    pub fn with_pipeline(pipeline: VisualOdometry) -> Self {
        Self {
            pipeline,
            state: RunState::Stopped,
            control: SessionControl::default(),
            rate: RateMeter::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    pub fn pipeline(&self) -> &VisualOdometry {
        &self.pipeline
    }

    /// Cycles per second over the last interval
    pub fn rate(&self) -> f64 {
        self.rate.rate()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.pipeline.snapshot(self.rate.rate())
    }

    pub fn start(&mut self) -> SlamResult<()> {
        if self.state == RunState::Running {
            return Err(SlamError::AlreadyRunning);
        }
        // A stop requested while idle must not cancel the new run
        self.control.take_stop();
        self.rate.reset();
        self.state = RunState::Running;
        info!("session started");
        Ok(())
    }

    pub fn stop(&mut self) -> SlamResult<()> {
        if self.state == RunState::Stopped {
            return Err(SlamError::NotRunning);
        }
        self.state = RunState::Stopped;
        info!("session stopped");
        Ok(())
    }

    /// Clear all pipeline state. Only reachable between cycles.
    pub fn reset(&mut self) {
        self.control.take_reset();
        self.pipeline.reset();
        self.rate.reset();
    }

    /// Process frames until the source ends or a stop is requested.
    ///
    /// Starts the session if it is stopped. After every cycle `observer` sees
    /// the report and the session. The source is released and the session
    /// returns to `Stopped` however the run ends.
    pub fn run<S, F>(&mut self, source: &mut S, mut observer: F) -> SlamResult<RunSummary>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&CycleReport, &Session),
    {
        if self.state == RunState::Stopped {
            self.start()?;
        }

        let result = self.drive(source, &mut observer);

        source.release();
        self.state = RunState::Stopped;
        match &result {
            Ok(summary) => info!("session stopped after {} cycles ({:?})", summary.cycles, summary.end),
            Err(e) => info!("session aborted: {}", e),
        }
        result
    }

    fn drive<S, F>(&mut self, source: &mut S, observer: &mut F) -> SlamResult<RunSummary>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&CycleReport, &Session),
    {
        let mut cycles = 0;
        loop {
            if self.control.take_reset() {
                self.reset();
            }
            if self.control.take_stop() {
                return Ok(RunSummary { cycles, end: RunEnd::StopRequested });
            }

            let Some(input) = source.next_frame() else {
                debug!("frame source exhausted");
                return Ok(RunSummary { cycles, end: RunEnd::EndOfStream });
            };

            let report = self.pipeline.process_input(&input)?;
            self.rate.tick(input.frame.timestamp);
            cycles += 1;
            observer(&report, self);
        }
    }
}
