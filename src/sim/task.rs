// Task runner for the solver thread

use std::{
    path::PathBuf,
    sync::mpsc,
    thread::{self, JoinHandle},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::{
    observers::{
        imgstream::{self, DisplayPacket},
        stats::FieldStats,
    },
    preprocessing::{HeadlessSettings, ImageStreamSettings, InterfaceMode, SimulationInput},
    sim::{Fluid, FluidResult},
};

pub struct SimulationOutput {
    /// Steps actually taken
    pub steps: usize,

    /// Simulated time covered
    pub elapsed_time: f32,

    /// Frames written to disk, zero when not streaming images
    pub frames: usize,

    /// Directory holding the frames, if any
    pub frames_dir: Option<PathBuf>,

    /// State after the final step
    pub final_stats: FieldStats,
}

/// Build the fluid described by `simulation_input`
pub fn build_fluid(simulation_input: &SimulationInput) -> FluidResult<Fluid> {
    let fluid = match simulation_input.seed {
        Some(seed) => Fluid::with_seed(simulation_input.grid_size, seed)?,
        None => Fluid::new(simulation_input.grid_size)?,
    };

    fluid
        .with_config(simulation_input.config)
        .with_viewport(simulation_input.viewport)
}

fn progress_bar(steps: usize) -> ProgressBar {
    let bar = ProgressBar::new(steps as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "[Elapsed: {elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} steps (Remaining: {eta_precise})",
    ) {
        bar.set_style(style.progress_chars("##-"));
    }
    bar
}

/// Apply this step's scripted forces, then advance the fluid once.
fn advance(fluid: &mut Fluid, simulation_input: &SimulationInput) {
    let step = fluid.steps();
    for impulse in simulation_input
        .emitters
        .iter()
        .filter_map(|emitter| emitter.impulse(step))
    {
        fluid.add_force(impulse.x, impulse.y, impulse.amount_x, impulse.amount_y);
    }

    fluid.step();
}

/// The solver thread task to run in ImageStream mode
pub fn imgstream_task(
    settings: &ImageStreamSettings,
    mut fluid: Fluid,
    simulation_input: &SimulationInput,
) -> SimulationOutput {
    let bar = progress_bar(simulation_input.steps);
    let (sender, receiver) = mpsc::channel();

    // spawn image io thread
    let frames_dir = settings.frames_dir.clone();
    let writer = thread::spawn(move || {
        imgstream::image_io_loop(receiver, &frames_dir).unwrap_or_else(|err| {
            error!("Frame writer stopped: {err}");
            0
        })
    });

    let interval = settings.frame_interval.max(1);
    let mut i = 0;

    // frame 0 is the initial state; dropping `send` hangs up the writer
    let mut send = move |fluid: &Fluid| {
        let packet = DisplayPacket {
            field: fluid.field(settings.view),
            i,
        };
        i += 1;
        sender.send(packet).is_ok()
    };

    let mut writing = send(&fluid);
    for _ in 0..simulation_input.steps {
        advance(&mut fluid, simulation_input);

        if writing && fluid.steps() % interval == 0 {
            writing = send(&fluid);
        }
        bar.inc(1);
    }
    bar.finish();

    drop(send);
    let frames = writer.join().unwrap_or_else(|_| {
        error!("Frame writer panicked");
        0
    });

    SimulationOutput {
        steps: fluid.steps(),
        elapsed_time: fluid.time(),
        frames,
        frames_dir: Some(settings.frames_dir.clone()),
        final_stats: FieldStats::measure(&fluid),
    }
}

/// The solver thread task to run in Headless mode
pub fn headless_task(
    settings: &HeadlessSettings,
    mut fluid: Fluid,
    simulation_input: &SimulationInput,
) -> SimulationOutput {
    let interval = settings.log_interval.max(1);

    FieldStats::measure(&fluid).log();
    for _ in 0..simulation_input.steps {
        advance(&mut fluid, simulation_input);

        if fluid.steps() % interval == 0 {
            FieldStats::measure(&fluid).log();
        }
    }

    SimulationOutput {
        steps: fluid.steps(),
        elapsed_time: fluid.time(),
        frames: 0,
        frames_dir: None,
        final_stats: FieldStats::measure(&fluid),
    }
}

/// Run the simulation described by `simulation_input` on the current thread
pub fn run(simulation_input: &SimulationInput) -> FluidResult<SimulationOutput> {
    let fluid = build_fluid(simulation_input)?;

    let output = match &simulation_input.mode {
        InterfaceMode::ImageStream(settings) => imgstream_task(settings, fluid, simulation_input),
        InterfaceMode::Headless(settings) => headless_task(settings, fluid, simulation_input),
    };

    info!(
        "Solved {} steps ({} s simulated), {} frames written",
        output.steps, output.elapsed_time, output.frames
    );

    Ok(output)
}

/// Spawns the simulation thread and starts the corresponding task
pub fn spawn_sim_thread(
    simulation_input: SimulationInput,
) -> JoinHandle<FluidResult<SimulationOutput>> {
    thread::spawn(move || run(&simulation_input))
}
