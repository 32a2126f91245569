// Scalar summaries of the simulation state for logging

use tracing::info;

use crate::sim::{Fluid, numeric};

/// Snapshot of a few global quantities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub step: usize,
    pub time: f32,
    pub total_density: f32,
    pub max_speed: f32,

    /// Root-mean-square divergence over the interior, in cell units
    pub rms_divergence: f32,
}

impl FieldStats {
    pub fn measure(fluid: &Fluid) -> Self {
        let [u, v] = fluid.velocity();
        let interior = (fluid.size() - 2).pow(2) as f32;
        let div = numeric::divergence(u, v);

        FieldStats {
            step: fluid.steps(),
            time: fluid.time(),
            total_density: fluid.total_density(),
            max_speed: fluid.max_speed(),
            rms_divergence: (div.norm_squared() / interior).sqrt(),
        }
    }

    pub fn log(&self) {
        info!(
            step = self.step,
            time = self.time,
            total_density = self.total_density,
            max_speed = self.max_speed,
            rms_divergence = self.rms_divergence,
            "diagnostics"
        );
    }
}
