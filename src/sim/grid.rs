// Field storage for the fluid grid

use na::DMatrix;
use rand::Rng;
use tracing::debug;

use crate::{
    ScalarField, VectorField,
    sim::error::{FluidError, FluidResult},
};

/// Smallest grid side that still leaves an interior cell
pub const MIN_GRID_SIZE: usize = 3;

/// Chance that an interior cell receives dye when the grid is reseeded
pub const SEED_PROBABILITY: f64 = 0.02;

/// Upper bound (exclusive) of a reseeded cell's concentration
pub const SEED_MAX_DENSITY: f32 = 50.0;

/// All arrays the solver works on. Every buffer is `size x size` and is
/// mutated in place; `pressure` and `divergence` are scratch space for the
/// projection and hold nothing meaningful between steps.
pub struct GridFields {
    /// Cells per side
    size: usize,

    /// Velocity field `[u, v]`
    pub velocity: VectorField,

    /// Velocity scratch; holds the diffused field during a velocity step
    pub velocity_prev: VectorField,

    /// Dye concentration
    pub density: ScalarField,

    /// Density scratch; holds the diffused field during a density step
    pub density_prev: ScalarField,

    /// Pressure solved during projection
    pub pressure: ScalarField,

    /// Divergence computed during projection
    pub divergence: ScalarField,
}

impl GridFields {
    /// Allocate a zeroed field set.
    ///
    /// Parameters
    /// - `size` - Cells per side; must be at least [`MIN_GRID_SIZE`]
    pub fn new(size: usize) -> FluidResult<Self> {
        if size < MIN_GRID_SIZE {
            return Err(FluidError::GridTooSmall { size });
        }

        let zeros = || DMatrix::zeros(size, size);

        Ok(GridFields {
            size,
            velocity: [zeros(), zeros()],
            velocity_prev: [zeros(), zeros()],
            density: zeros(),
            density_prev: zeros(),
            pressure: zeros(),
            divergence: zeros(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat offset of cell `(x, y)`; matches the layout of `as_slice()`
    pub fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.size
    }

    /// Whether `(x, y)` is updated by the kernels rather than by boundary reflection
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        (1..self.size - 1).contains(&x) && (1..self.size - 1).contains(&y)
    }

    /// Zero every buffer
    pub fn clear(&mut self) {
        let [u, v] = &mut self.velocity;
        let [u_prev, v_prev] = &mut self.velocity_prev;

        for field in [
            u,
            v,
            u_prev,
            v_prev,
            &mut self.density,
            &mut self.density_prev,
            &mut self.pressure,
            &mut self.divergence,
        ] {
            field.fill(0.);
        }
    }

    /// Zero every buffer and scatter a few random dye seeds over the interior.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.clear();
        self.seed_density(rng);
    }

    /// Drop random concentrations into a sparse subset of interior cells.
    /// Purely cosmetic so a fresh simulation has something to look at.
    pub fn seed_density<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let n = self.size;
        let mut seeded = 0;

        for y in 1..(n - 1) {
            for x in 1..(n - 1) {
                if rng.random_bool(SEED_PROBABILITY) {
                    self.density[(x, y)] = rng.random_range(0.0..SEED_MAX_DENSITY);
                    seeded += 1;
                }
            }
        }

        debug!("Seeded {seeded} of {} interior cells with dye", (n - 2) * (n - 2));
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_rejects_small_grids() {
        assert_eq!(
            GridFields::new(2).err(),
            Some(FluidError::GridTooSmall { size: 2 })
        );
        assert!(GridFields::new(0).is_err());
        assert!(GridFields::new(MIN_GRID_SIZE).is_ok());
    }

    #[test]
    fn test_index_matches_storage() {
        let mut fields = GridFields::new(6).unwrap();
        fields.density[(4, 2)] = 7.;

        let k = fields.index(4, 2);
        assert_eq!(k, 4 + 2 * 6);
        assert_eq!(fields.density.as_slice()[k], 7.);
    }

    #[test]
    fn test_interior() {
        let fields = GridFields::new(5).unwrap();

        assert!(fields.is_interior(1, 1));
        assert!(fields.is_interior(3, 3));
        assert!(!fields.is_interior(0, 2));
        assert!(!fields.is_interior(2, 4));
    }

    #[test]
    fn test_reset_seeds_interior_only() {
        let mut fields = GridFields::new(64).unwrap();
        fields.velocity[0].fill(3.);

        let mut rng = StdRng::seed_from_u64(7);
        fields.reset(&mut rng);

        assert_eq!(fields.velocity[0].sum(), 0.);

        let n = fields.size();
        let mut seeded = 0;
        for y in 0..n {
            for x in 0..n {
                let d = fields.density[(x, y)];
                if !fields.is_interior(x, y) {
                    assert_eq!(d, 0.);
                }
                assert!((0.0..SEED_MAX_DENSITY).contains(&d));
                if d > 0. {
                    seeded += 1;
                }
            }
        }

        // sparse, but a 62x62 interior should get at least a handful
        assert!(seeded > 0);
        assert!(seeded < (n - 2) * (n - 2) / 4);
    }

    #[test]
    fn test_reset_is_reproducible() {
        let mut a = GridFields::new(32).unwrap();
        let mut b = GridFields::new(32).unwrap();

        a.reset(&mut StdRng::seed_from_u64(99));
        b.reset(&mut StdRng::seed_from_u64(99));

        assert_eq!(a.density, b.density);
    }
}
