use crate::engine::ffmpeg::Engine;
use crate::engine::probe::Probe;
use crate::foundation::error::SteadycamResult;
use crate::render::plan::{RenderRequest, plan_render};
use crate::schedule::queue::BoundedQueue;

/// Analysis passes allowed to run at once.
pub const ANALYSE_CONCURRENCY: usize = 2;
/// Encode passes allowed to run at once.
pub const ENCODE_CONCURRENCY: usize = 4;

/// Lifecycle of one render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// Accepted, not started.
    Pending,
    /// Analysis pass running.
    Analysing,
    /// Encode pass running.
    Encoding,
    /// Finished successfully.
    Done,
    /// Stopped by an error.
    Failed,
}

/// Phase of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Motion analysis.
    Analyse,
    /// Final encode.
    Encode,
}

/// One observable step of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    /// The request moved to a state.
    Entered(RenderState),
    /// The request had nothing to do in a phase.
    Skipped(Phase),
}

/// Steps a render went through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Events in order.
    pub events: Vec<RenderEvent>,
}

impl RenderReport {
    fn push(&mut self, event: RenderEvent) {
        tracing::debug!(?event, "render transition");
        self.events.push(event);
    }

    /// Last state entered.
    pub fn state(&self) -> RenderState {
        self.events
            .iter()
            .rev()
            .find_map(|e| match e {
                RenderEvent::Entered(s) => Some(*s),
                RenderEvent::Skipped(_) => None,
            })
            .unwrap_or(RenderState::Pending)
    }
}

/// Drives render requests through analysis and encoding.
///
/// Each phase has its own queue. A request holds at most one slot at a time and only asks for
/// an encode slot once its analysis succeeded.
#[derive(Debug)]
pub struct Scheduler<E, P> {
    engine: E,
    probe: P,
    analyse: BoundedQueue,
    encode: BoundedQueue,
}

impl<E: Engine, P: Probe> Scheduler<E, P> {
    /// Scheduler with the default phase limits.
    pub fn new(engine: E, probe: P) -> Self {
        Self::with_limits(engine, probe, ANALYSE_CONCURRENCY, ENCODE_CONCURRENCY)
    }

    /// Scheduler with explicit phase limits.
    pub fn with_limits(engine: E, probe: P, analyse: usize, encode: usize) -> Self {
        Self {
            engine,
            probe,
            analyse: BoundedQueue::new("analyse", analyse),
            encode: BoundedQueue::new("encode", encode),
        }
    }

    /// Engine jobs run on.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Probe, plan and run `request`.
    ///
    /// Any error rejects the whole request. A failed analysis never reaches the encode queue.
    #[tracing::instrument(
        skip_all,
        fields(source = %request.source.display(), dest = %request.dest.display())
    )]
    pub async fn render(&self, request: &RenderRequest) -> SteadycamResult<RenderReport> {
        let mut report = RenderReport::default();
        report.push(RenderEvent::Entered(RenderState::Pending));
        match self.run(request, &mut report).await {
            Ok(()) => {
                report.push(RenderEvent::Entered(RenderState::Done));
                tracing::info!("render finished");
                Ok(report)
            }
            Err(err) => {
                report.push(RenderEvent::Entered(RenderState::Failed));
                tracing::error!(error = %err, events = ?report.events, "render failed");
                Err(err)
            }
        }
    }

    async fn run(&self, request: &RenderRequest, report: &mut RenderReport) -> SteadycamResult<()> {
        let video = self.probe.probe(&request.source).await?;
        let plan = plan_render(request, &video)?;

        match &plan.analyse {
            Some(job) => {
                report.push(RenderEvent::Entered(RenderState::Analysing));
                self.analyse.submit(self.engine.run(job)).await?;
            }
            None => report.push(RenderEvent::Skipped(Phase::Analyse)),
        }
        match &plan.encode {
            Some(job) => {
                report.push(RenderEvent::Entered(RenderState::Encoding));
                self.encode.submit(self.engine.run(job)).await?;
            }
            None => report.push(RenderEvent::Skipped(Phase::Encode)),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
