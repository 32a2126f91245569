// Contains post-processers for analyzing simulation results

pub mod display;

use crate::{
    preprocessing::{InterfaceMode, SimulationInput},
    sim::task::SimulationOutput,
};
use std::fs;
use tracing::{info, warn};

/// Playback frames per second
pub const PLAYBACK_FPS: usize = 60;

pub fn postprocess(sim_input: SimulationInput, sim_output: SimulationOutput) {
    let stats = sim_output.final_stats;
    info!(
        "Final state: total density {:.3}, max speed {:.4}, rms divergence {:.2e}",
        stats.total_density, stats.max_speed, stats.rms_divergence
    );

    if let InterfaceMode::ImageStream(settings) = sim_input.mode {
        if settings.display_video && sim_output.frames > 0 {
            _ = display::play_video(PLAYBACK_FPS, &settings.frames_dir)
                .inspect_err(|err| warn!("Unable to play back frames: {:?}", err));
        }

        if !settings.retain_frames {
            _ = fs::remove_dir_all(settings.frames_dir)
                .inspect_err(|err| warn!("Unable to cleanup frames output: {:?}", err));
        }
    };
}
