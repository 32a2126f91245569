// Numeric kernels shared by the velocity and density steps

use na::DMatrix;

use crate::ScalarField;

/// Which reflection rule the border of a field follows.
///
/// - `Scalar` (kind 0): every border cell copies its interior neighbour
/// - `VelocityX` (kind 1): left/right walls copy with a sign flip
/// - `VelocityY` (kind 2): top/bottom walls copy with a sign flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Scalar,
    VelocityX,
    VelocityY,
}

impl Boundary {
    /// Factor applied when mirroring onto the left/right walls
    fn x_wall_sign(self) -> f32 {
        match self {
            Boundary::VelocityX => -1.,
            _ => 1.,
        }
    }

    /// Factor applied when mirroring onto the top/bottom walls
    fn y_wall_sign(self) -> f32 {
        match self {
            Boundary::VelocityY => -1.,
            _ => 1.,
        }
    }
}

/// Derive the single-cell border of `field` from its interior.
///
/// Walls mirror the adjacent interior cell (negated on the walls a velocity
/// component points through) and each corner takes the mean of its two edge
/// neighbours.
pub fn set_boundary(boundary: Boundary, field: &mut ScalarField) {
    let n = field.nrows();
    let (sx, sy) = (boundary.x_wall_sign(), boundary.y_wall_sign());

    for k in 1..(n - 1) {
        field[(0, k)] = sx * field[(1, k)];
        field[(n - 1, k)] = sx * field[(n - 2, k)];

        field[(k, 0)] = sy * field[(k, 1)];
        field[(k, n - 1)] = sy * field[(k, n - 2)];
    }

    field[(0, 0)] = 0.5 * (field[(1, 0)] + field[(0, 1)]);
    field[(0, n - 1)] = 0.5 * (field[(1, n - 1)] + field[(0, n - 2)]);
    field[(n - 1, 0)] = 0.5 * (field[(n - 2, 0)] + field[(n - 1, 1)]);
    field[(n - 1, n - 1)] = 0.5 * (field[(n - 2, n - 1)] + field[(n - 1, n - 2)]);
}

/// Relax `x` toward the solution of `c·x - a·Σneighbours(x) = x0` over the
/// interior. Runs exactly `iterations` sweeps with no residual check, and
/// refreshes the border after each sweep since the next one reads it.
///
/// Parameters
/// - `boundary` - Border rule applied after every sweep
/// - `x` - The field being solved for; its current contents are the initial guess
/// - `x0` - The right-hand side
/// - `a` - Weight of the 4-neighbourhood
/// - `c` - Normalising denominator
/// - `iterations` - Number of sweeps
pub fn relax(
    boundary: Boundary,
    x: &mut ScalarField,
    x0: &ScalarField,
    a: f32,
    c: f32,
    iterations: usize,
) {
    let n = x.nrows();
    let c_inv = 1. / c;

    for _ in 0..iterations {
        for j in 1..(n - 1) {
            for i in 1..(n - 1) {
                let neighbours = x[(i + 1, j)] + x[(i - 1, j)] + x[(i, j + 1)] + x[(i, j - 1)];
                x[(i, j)] = (x0[(i, j)] + a * neighbours) * c_inv;
            }
        }
        set_boundary(boundary, x);
    }
}

/// Implicit (backward Euler) diffusion of `src` into `dst`.
///
/// The coefficient is scaled by the interior cell count, `a = dt·rate·(N-2)²`,
/// so the spread per unit time does not depend on resolution. A zero rate
/// reduces to a copy.
pub fn diffuse(
    boundary: Boundary,
    dst: &mut ScalarField,
    src: &ScalarField,
    rate: f32,
    dt: f32,
    iterations: usize,
) {
    let interior = (dst.nrows() - 2) as f32;
    let a = dt * rate * interior * interior;

    dst.copy_from(src);
    relax(boundary, dst, src, a, 1. + 4. * a, iterations);
}

/// Semi-Lagrangian advection of `src` into `dst` along `(velocity_x, velocity_y)`.
///
/// Each interior cell is traced back one time step and `src` is bilinearly
/// sampled there. The traced position is clamped to `[0.5, N-1.5]`, which
/// keeps all four samples on the grid whatever the velocity or `dt`.
pub fn advect(
    boundary: Boundary,
    dst: &mut ScalarField,
    src: &ScalarField,
    velocity_x: &ScalarField,
    velocity_y: &ScalarField,
    dt: f32,
) {
    let n = dst.nrows();
    let dt0 = dt * n as f32;
    let (lo, hi) = (0.5, n as f32 - 1.5);

    for j in 1..(n - 1) {
        for i in 1..(n - 1) {
            let x = (i as f32 - dt0 * velocity_x[(i, j)]).clamp(lo, hi);
            let y = (j as f32 - dt0 * velocity_y[(i, j)]).clamp(lo, hi);

            // a NaN coordinate survives the clamp but casts to cell 0
            let (i0, j0) = (x.floor() as usize, y.floor() as usize);
            let (i1, j1) = (i0 + 1, j0 + 1);

            let s1 = x - i0 as f32;
            let s0 = 1. - s1;
            let t1 = y - j0 as f32;
            let t0 = 1. - t1;

            dst[(i, j)] = s0 * (t0 * src[(i0, j0)] + t1 * src[(i0, j1)])
                + s1 * (t0 * src[(i1, j0)] + t1 * src[(i1, j1)]);
        }
    }

    set_boundary(boundary, dst);
}

/// Scale every cell by `factor`; a per-step exponential decay.
pub fn dissipate(field: &mut ScalarField, factor: f32) {
    field.scale_mut(factor);
}

/// Central-difference divergence of `(velocity_x, velocity_y)` at each
/// interior cell, in cell units. Border cells are zero.
pub fn divergence(velocity_x: &ScalarField, velocity_y: &ScalarField) -> ScalarField {
    let n = velocity_x.nrows();
    let mut div: ScalarField = DMatrix::zeros(n, n);

    for j in 1..(n - 1) {
        for i in 1..(n - 1) {
            div[(i, j)] = 0.5
                * (velocity_x[(i + 1, j)] - velocity_x[(i - 1, j)] + velocity_y[(i, j + 1)]
                    - velocity_y[(i, j - 1)]);
        }
    }

    div
}

/// Per-cell speed `|(u, v)|`
pub fn velocity_magnitude(velocity_x: &ScalarField, velocity_y: &ScalarField) -> ScalarField {
    velocity_x.zip_map(velocity_y, |u, v| u.hypot(v))
}
