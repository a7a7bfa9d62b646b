//! Render planning: options, devices, stabilisation pipelines and the comparison grid.

/// Comparison grid layout and composition.
pub mod compare;
/// Device initialisation and the formats it implies.
pub mod hardware;
/// Input and output side pipelines and engine arguments.
pub mod io;
/// Render options.
pub mod options;
/// Engine jobs for each phase of a render.
pub mod plan;
/// Stabilisation pipeline factories.
pub mod stabilise;
