/// Frame rates and sizes.
pub mod core;
/// Error taxonomy.
pub mod error;
/// Field-of-view and angle helpers.
pub mod math;
