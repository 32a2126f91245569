use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    preprocessing::emitter::Emitter,
    sim::{FieldView, FluidConfig, FluidResult, Viewport, grid::GridFields},
};

pub mod cli;
pub mod emitter;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageStreamSettings {
    pub frames_dir: PathBuf,
    pub retain_frames: bool,
    pub display_video: bool,

    /// Steps between saved frames
    pub frame_interval: usize,

    /// The field written to each frame
    pub view: FieldView,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HeadlessSettings {
    /// Steps between logged diagnostics
    pub log_interval: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum InterfaceMode {
    ImageStream(ImageStreamSettings),
    Headless(HeadlessSettings),
}

impl InterfaceMode {
    pub fn name(&self) -> &'static str {
        match self {
            InterfaceMode::ImageStream(_) => "image stream",
            InterfaceMode::Headless(_) => "headless",
        }
    }
}

/// Everything needed to run one simulation from the command line
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SimulationInput {
    pub mode: InterfaceMode,
    pub grid_size: usize,
    pub steps: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub config: FluidConfig,
    pub viewport: Viewport,

    #[serde(default)]
    pub emitters: Vec<Emitter>,
}

impl SimulationInput {
    /// Fail fast on anything that would make the run meaningless
    pub fn validate(&self) -> FluidResult<()> {
        GridFields::new(self.grid_size)?;
        self.config.validate()?;
        self.viewport.validate()?;
        Ok(())
    }

    pub fn log(&self) {
        info!(
            "Simulation is shown below:\n\n\
        \t mode:                 {}\n\
        \t grid:                 {} x {}\n\
        \t steps:                {}\n\
        \t dt:                   {}\n\
        \t diffusion:            {}\n\
        \t viscosity:            {}\n\
        \t iterations:           {}\n\
        \t density dissipation:  {}\n\
        \t velocity dissipation: {}\n\
        \t force:                x{} over r = {} cells\n\
        \t viewport:             {} x {}\n\
        \t emitters:             {}\n\n\
        ",
            self.mode.name(),
            self.grid_size,
            self.grid_size,
            self.steps,
            self.config.dt,
            self.config.diffusion,
            self.config.viscosity,
            self.config.iterations,
            self.config.density_dissipation,
            self.config.velocity_dissipation,
            self.config.force_multiplier,
            self.config.force_radius,
            self.viewport.width,
            self.viewport.height,
            self.emitters.len(),
        );

        if let Ok(mode_str) = serde_json::to_string_pretty(&self.mode) {
            info!("Mode parameters are:\n\n{}", mode_str);
        }
    }
}
