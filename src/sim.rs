// Grid-based stable fluids solver

pub mod config;
pub mod error;
pub mod fluid;
pub mod force;
pub mod grid;
pub mod numeric;
pub mod poisson;
pub mod task;

pub use config::{FieldView, FluidConfig, Preset};
pub use error::{FluidError, FluidResult};
pub use fluid::Fluid;
pub use force::Viewport;
pub use grid::GridFields;
