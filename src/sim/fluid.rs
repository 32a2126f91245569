// Stable fluids stepping object

use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, warn};

use crate::{
    ScalarField, VectorField,
    sim::{
        config::{FieldView, FluidConfig},
        error::FluidResult,
        force::{self, Viewport},
        grid::GridFields,
        numeric::{self, Boundary},
        poisson,
    },
};

/// High-level stable fluids object. Owns the grid, the live configuration and
/// the random source used for reseeding, and advances the simulation one
/// step at a time.
///
/// Single-threaded by contract: `step()` and `add_force()` run to completion
/// and callers serialize them.
pub struct Fluid {
    /// Solver tunables; read fresh by every `step()`
    pub config: FluidConfig,

    /// The caller's coordinate space for `add_force`
    viewport: Viewport,

    /// All field arrays
    fields: GridFields,

    /// Steps taken since the last reset
    steps: usize,

    /// Simulated time since the last reset
    time: f32,

    /// Random source for density reseeding
    rng: StdRng,
}

impl Fluid {
    /// Create a simulation on a `size x size` grid with an OS-seeded random
    /// source and default configuration.
    pub fn new(size: usize) -> FluidResult<Self> {
        Self::from_rng(size, StdRng::from_os_rng())
    }

    /// Same as `new`, but with a reproducible initial density seeding
    pub fn with_seed(size: usize, seed: u64) -> FluidResult<Self> {
        Self::from_rng(size, StdRng::seed_from_u64(seed))
    }

    fn from_rng(size: usize, mut rng: StdRng) -> FluidResult<Self> {
        let mut fields = GridFields::new(size)?;
        fields.reset(&mut rng);

        debug!("Created {size}x{size} fluid grid");

        Ok(Fluid {
            config: FluidConfig::default(),
            viewport: Viewport::identity(size),
            fields,
            steps: 0,
            time: 0.,
            rng,
        })
    }

    pub fn with_config(mut self, config: FluidConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> FluidResult<Self> {
        self.set_viewport(viewport)?;
        Ok(self)
    }

    /// Change the coordinate space used by `add_force`, e.g. after a window resize
    pub fn set_viewport(&mut self, viewport: Viewport) -> FluidResult<()> {
        viewport.validate()?;
        self.viewport = viewport;
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Zero all fields and scatter fresh dye seeds
    pub fn reset(&mut self) {
        self.fields.reset(&mut self.rng);
        self.steps = 0;
        self.time = 0.;
        debug!("Fluid reset");
    }

    /// Zero all fields without reseeding
    pub fn clear(&mut self) {
        self.fields.clear();
        self.steps = 0;
        self.time = 0.;
    }

    /// Push the fluid at a point given in viewport coordinates.
    ///
    /// Calls with a non-finite coordinate or amount are ignored; they would
    /// poison the whole grid within one step.
    pub fn add_force(&mut self, x: f32, y: f32, amount_x: f32, amount_y: f32) {
        let (gx, gy) = self.viewport.to_grid(x, y, self.size());
        self.add_force_at_cell(gx, gy, amount_x, amount_y);
    }

    /// Push the fluid at a point given in grid coordinates
    pub fn add_force_at_cell(&mut self, x: f32, y: f32, amount_x: f32, amount_y: f32) {
        if ![x, y, amount_x, amount_y].iter().all(|v| v.is_finite()) {
            warn!("Ignoring non-finite force ({amount_x}, {amount_y}) at ({x}, {y})");
            return;
        }

        let config = self.config.sanitized();
        force::add_force(&mut self.fields, x, y, amount_x, amount_y, &config);
    }

    /// Advance the simulation by one `config.dt`
    pub fn step(&mut self) {
        let config = self.config.sanitized();
        if config != self.config {
            warn!("Configuration out of range; stepping with {:?}", config);
        }

        velocity_step(&mut self.fields, &config);
        density_step(&mut self.fields, &config);

        self.steps += 1;
        self.time += config.dt;
    }

    pub fn size(&self) -> usize {
        self.fields.size()
    }

    /// Flat offset of `(x, y)` in every field's `as_slice()`
    pub fn index(&self, x: usize, y: usize) -> usize {
        self.fields.index(x, y)
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn density(&self) -> &ScalarField {
        &self.fields.density
    }

    pub fn velocity(&self) -> &VectorField {
        &self.fields.velocity
    }

    /// Per-cell speed, computed on demand for velocity visualisation
    pub fn velocity_magnitude(&self) -> ScalarField {
        let [u, v] = &self.fields.velocity;
        numeric::velocity_magnitude(u, v)
    }

    /// An owned copy of the field a renderer wants to display
    pub fn field(&self, view: FieldView) -> ScalarField {
        match view {
            FieldView::Density => self.fields.density.clone(),
            FieldView::Velocity => self.velocity_magnitude(),
        }
    }

    pub fn fields(&self) -> &GridFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut GridFields {
        &mut self.fields
    }

    pub fn total_density(&self) -> f32 {
        self.fields.density.sum()
    }

    pub fn max_speed(&self) -> f32 {
        self.velocity_magnitude().max()
    }
}

/// Diffuse, project, self-advect, project again and decay the velocity field.
fn velocity_step(fields: &mut GridFields, config: &FluidConfig) {
    let [u, v] = &mut fields.velocity;
    let [u_prev, v_prev] = &mut fields.velocity_prev;
    let (pressure, divergence) = (&mut fields.pressure, &mut fields.divergence);

    numeric::diffuse(Boundary::VelocityX, u_prev, u, config.viscosity, config.dt, config.iterations);
    numeric::diffuse(Boundary::VelocityY, v_prev, v, config.viscosity, config.dt, config.iterations);

    poisson::project(u_prev, v_prev, pressure, divergence, config.iterations);

    // both components are traced through the same, pre-advection field
    numeric::advect(Boundary::VelocityX, u, u_prev, u_prev, v_prev, config.dt);
    numeric::advect(Boundary::VelocityY, v, v_prev, u_prev, v_prev, config.dt);

    poisson::project(u, v, pressure, divergence, config.iterations);

    numeric::dissipate(u, config.velocity_dissipation);
    numeric::dissipate(v, config.velocity_dissipation);
}

/// Diffuse, advect through the updated velocity and decay the density field.
fn density_step(fields: &mut GridFields, config: &FluidConfig) {
    let [u, v] = &fields.velocity;

    numeric::diffuse(
        Boundary::Scalar,
        &mut fields.density_prev,
        &fields.density,
        config.diffusion,
        config.dt,
        config.iterations,
    );
    numeric::advect(
        Boundary::Scalar,
        &mut fields.density,
        &fields.density_prev,
        u,
        v,
        config.dt,
    );
    numeric::dissipate(&mut fields.density, config.density_dissipation);
}
