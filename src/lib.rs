extern crate nalgebra as na;

pub mod observers;
pub mod postprocessing;
pub mod preprocessing;
pub mod sim;

use na::DMatrix;

/// A grid-sized scalar field addressed as `(x, y)`. Storage is column-major,
/// so the flat offset of `(x, y)` is `x + y * N`.
pub type ScalarField = DMatrix<f32>;

/// Cartesian vector field stored as `[x-component, y-component]`
pub type VectorField = [ScalarField; 2];
