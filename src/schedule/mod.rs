//! Two-phase execution of render requests under bounded concurrency.

/// Capacity-bounded task admission.
pub mod queue;
/// Analyse and encode phases of a render.
pub mod scheduler;

pub use queue::BoundedQueue;
pub use scheduler::{
    ANALYSE_CONCURRENCY, ENCODE_CONCURRENCY, Phase, RenderEvent, RenderReport, RenderState,
    Scheduler,
};
