// Pressure projection through a fixed-count pressure-Poisson relaxation

use crate::{
    ScalarField,
    sim::numeric::{self, Boundary},
};

/// Remove (most of) the divergence from a velocity field in place.
///
/// Mathematically, this solves ∇²p = ∇⋅u and then sets u ← u - ∇p, using
/// `iterations` relaxation sweeps for the Poisson solve.
///
/// Parameters
/// - `velocity_x` - The x-component; corrected in place
/// - `velocity_y` - The y-component; corrected in place
/// - `pressure` - Scratch buffer; holds the solved pressure afterwards
/// - `divergence` - Scratch buffer; holds the scaled input divergence afterwards
/// - `iterations` - Number of relaxation sweeps
pub fn project(
    velocity_x: &mut ScalarField,
    velocity_y: &mut ScalarField,
    pressure: &mut ScalarField,
    divergence: &mut ScalarField,
    iterations: usize,
) {
    let n = velocity_x.nrows();
    let nf = n as f32;

    for j in 1..(n - 1) {
        for i in 1..(n - 1) {
            divergence[(i, j)] = -0.5
                * (velocity_x[(i + 1, j)] - velocity_x[(i - 1, j)] + velocity_y[(i, j + 1)]
                    - velocity_y[(i, j - 1)])
                / nf;
        }
    }
    pressure.fill(0.);

    numeric::set_boundary(Boundary::Scalar, divergence);
    numeric::set_boundary(Boundary::Scalar, pressure);

    numeric::relax(Boundary::Scalar, pressure, divergence, 1., 4., iterations);

    // subtract the pressure gradient
    for j in 1..(n - 1) {
        for i in 1..(n - 1) {
            velocity_x[(i, j)] -= 0.5 * nf * (pressure[(i + 1, j)] - pressure[(i - 1, j)]);
            velocity_y[(i, j)] -= 0.5 * nf * (pressure[(i, j + 1)] - pressure[(i, j - 1)]);
        }
    }

    numeric::set_boundary(Boundary::VelocityX, velocity_x);
    numeric::set_boundary(Boundary::VelocityY, velocity_y);
}
