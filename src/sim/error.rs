// Error types for the fluid core

use thiserror::Error;

use crate::sim::grid::MIN_GRID_SIZE;

pub type FluidResult<T> = Result<T, FluidError>;

/// Precondition violations caught when a simulation is built or configured.
/// Nothing inside `step()` or `add_force()` produces one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    #[error("grid size {size} is too small; at least {MIN_GRID_SIZE} cells per side are required")]
    GridTooSmall { size: usize },

    #[error("invalid configuration: `{name}` = {value} ({expected})")]
    InvalidConfig {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("invalid viewport {width} x {height}; both sides must be finite and positive")]
    InvalidViewport { width: f32, height: f32 },
}
