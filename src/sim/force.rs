// External force injection

use serde::{Deserialize, Serialize};

use crate::sim::{
    config::FluidConfig,
    error::{FluidError, FluidResult},
    grid::GridFields,
};

/// Dye added at full influence wherever a force lands, so disturbances are visible
pub const DYE_PER_FORCE: f32 = 100.;

/// Discs larger than this multiple of the grid side are shrunk to it; they
/// already cover every cell.
const MAX_RADIUS_IN_GRIDS: f32 = 2.;

/// The caller's coordinate space. A point `(x, y)` in the viewport lands on
/// grid coordinate `(x / width * N, y / height * N)`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> FluidResult<Self> {
        let viewport = Viewport { width, height };
        viewport.validate()?;
        Ok(viewport)
    }

    /// A viewport whose coordinates already are grid coordinates
    pub fn identity(size: usize) -> Self {
        Viewport {
            width: size as f32,
            height: size as f32,
        }
    }

    pub fn validate(&self) -> FluidResult<()> {
        let ok = |v: f32| v.is_finite() && v > 0.;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(FluidError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Map a viewport point onto (fractional) grid coordinates
    pub fn to_grid(&self, x: f32, y: f32, size: usize) -> (f32, f32) {
        let n = size as f32;
        (x / self.width * n, y / self.height * n)
    }
}

/// Spread a force over the disc of `config.force_radius` cells around the
/// grid point `(x, y)`.
///
/// Influence falls linearly from 1 at the nearest cell to 0 at the rim. Cells
/// that would fall off the grid are clamped onto the border instead of being
/// dropped. Each touched cell gains `amount·force_multiplier·influence` of
/// velocity and `DYE_PER_FORCE·influence` of density.
///
/// Parameters
/// - `fields` - The grid to disturb
/// - `x`, `y` - Centre in grid coordinates
/// - `amount_x`, `amount_y` - Force vector before scaling
/// - `config` - Supplies `force_multiplier` and `force_radius`
pub fn add_force(
    fields: &mut GridFields,
    x: f32,
    y: f32,
    amount_x: f32,
    amount_y: f32,
    config: &FluidConfig,
) {
    let n = fields.size();
    let last = (n - 1) as i64;
    let radius = config.force_radius.min(MAX_RADIUS_IN_GRIDS * n as f32);

    // `as` saturates, so far-off centres just pin to the edge
    let cx = (x.round() as i64).clamp(0, last);
    let cy = (y.round() as i64).clamp(0, last);

    let fx = amount_x * config.force_multiplier;
    let fy = amount_y * config.force_multiplier;

    let reach = radius.max(0.).ceil() as i64;

    for j in -reach..=reach {
        for i in -reach..=reach {
            let d = ((i * i + j * j) as f32).sqrt();

            let influence = if radius > 0. {
                if d > radius {
                    continue;
                }
                1. - d / radius
            } else {
                1.
            };

            let tx = (cx + i).clamp(0, last) as usize;
            let ty = (cy + j).clamp(0, last) as usize;

            fields.velocity[0][(tx, ty)] += fx * influence;
            fields.velocity[1][(tx, ty)] += fy * influence;
            fields.density[(tx, ty)] += DYE_PER_FORCE * influence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn force_config(radius: f32) -> FluidConfig {
        FluidConfig {
            force_multiplier: 1.,
            force_radius: radius,
            ..Default::default()
        }
    }

    fn distance(a: (usize, usize), b: (usize, usize)) -> f32 {
        let dx = a.0 as f32 - b.0 as f32;
        let dy = a.1 as f32 - b.1 as f32;
        (dx * dx + dy * dy).sqrt()
    }

    #[test]
    fn test_force_is_local() {
        let mut fields = GridFields::new(32).unwrap();
        add_force(&mut fields, 16., 16., 10., -4., &force_config(5.));

        for y in 0..32 {
            for x in 0..32 {
                if distance((x, y), (16, 16)) > 5. {
                    assert_eq!(fields.velocity[0][(x, y)], 0.);
                    assert_eq!(fields.velocity[1][(x, y)], 0.);
                    assert_eq!(fields.density[(x, y)], 0.);
                }
            }
        }

        assert_eq!(fields.velocity[0][(16, 16)], 10.);
        assert_eq!(fields.velocity[1][(16, 16)], -4.);
        assert_eq!(fields.density[(16, 16)], DYE_PER_FORCE);
    }

    #[test]
    fn test_force_radially_symmetric() {
        let mut fields = GridFields::new(32).unwrap();
        add_force(&mut fields, 16., 16., 10., 0., &force_config(5.));

        let u = &fields.velocity[0];

        for k in 0..5 {
            // decreasing outward along an axis
            assert!(u[(16 + k, 16)] > u[(16 + k + 1, 16)]);

            let along = u[(16 + k, 16)];
            assert_eq!(along, u[(16 - k, 16)]);
            assert_eq!(along, u[(16, 16 + k)]);
            assert_eq!(along, u[(16, 16 - k)]);
        }

        // the rim itself gets zero influence
        assert_eq!(u[(21, 16)], 0.);
        assert_eq!(u[(19, 20)], 0.);
        assert_eq!(u[(19, 19)], u[(13, 13)]);
        assert!(fields.velocity[1].iter().all(|v| *v == 0.));
    }

    #[test]
    fn test_force_scales_with_multiplier() {
        let mut fields = GridFields::new(16).unwrap();
        let config = FluidConfig {
            force_multiplier: 3.,
            force_radius: 2.,
            ..Default::default()
        };
        add_force(&mut fields, 8., 8., 2., 1., &config);

        assert_eq!(fields.velocity[0][(8, 8)], 6.);
        assert_eq!(fields.velocity[1][(8, 8)], 3.);
        assert_eq!(fields.velocity[0][(9, 8)], 3.);

        // dye does not depend on the force
        assert_eq!(fields.density[(9, 8)], 0.5 * DYE_PER_FORCE);
    }

    #[test]
    fn test_force_rounds_to_nearest_cell() {
        let mut fields = GridFields::new(16).unwrap();
        add_force(&mut fields, 4.6, 7.2, 1., 0., &force_config(1.));

        assert_eq!(fields.velocity[0][(5, 7)], 1.);
    }

    #[test]
    fn test_force_clamps_at_edge() {
        let mut fields = GridFields::new(16).unwrap();
        add_force(&mut fields, -40., 0., 10., 0., &force_config(2.));

        // several offsets collapse onto the corner
        assert!(fields.velocity[0][(0, 0)] > 10.);
        assert_eq!(fields.velocity[0][(3, 0)], 0.);
    }

    #[test]
    fn test_zero_radius_hits_one_cell() {
        let mut fields = GridFields::new(8).unwrap();
        add_force(&mut fields, 3., 3., 2., 2., &force_config(0.));

        assert_eq!(fields.velocity[0][(3, 3)], 2.);
        assert_eq!(fields.velocity[0].sum(), 2.);
        assert_eq!(fields.density.sum(), DYE_PER_FORCE);
    }

    #[test]
    fn test_huge_radius_is_bounded() {
        let mut fields = GridFields::new(8).unwrap();
        add_force(&mut fields, 4., 4., 1., 0., &force_config(1e9));

        assert!(fields.velocity[0].iter().all(|v| *v > 0. && v.is_finite()));
    }

    #[test]
    fn test_viewport_mapping() {
        let viewport = Viewport::new(800., 400.).unwrap();
        assert_eq!(viewport.to_grid(400., 100., 64), (32., 16.));

        let (gx, gy) = Viewport::identity(10).to_grid(3., 7., 10);
        assert!((gx - 3.).abs() < 1e-5 && (gy - 7.).abs() < 1e-5);

        assert!(Viewport::new(0., 10.).is_err());
        assert!(Viewport::new(f32::NAN, 10.).is_err());
    }
}
