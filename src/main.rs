use std::{fs, process::exit};

use clap::Parser;
use stable_fluids::{
    postprocessing,
    preprocessing::cli::CliArgs,
    sim::task,
};
use tracing::{Level, error, info};

fn main() {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let simulation_input = match args.create_input() {
        Ok(input) => input,
        Err(err) => {
            error!("Invalid input: {err}");
            exit(1);
        }
    };

    simulation_input.log();

    if let Some(savepath) = &args.input_json_savepath {
        match serde_json::to_string_pretty(&simulation_input) {
            Ok(json) => match fs::write(savepath, json) {
                Ok(()) => info!("Saved input to {}", savepath.display()),
                Err(err) => error!("Failed to save input file: {err}"),
            },
            Err(err) => error!("Failed to serialize input: {err}"),
        }
    }

    let sim_thread = task::spawn_sim_thread(simulation_input.clone());

    let sim_output = match sim_thread.join() {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            error!("Simulation failed: {err}");
            exit(1);
        }
        Err(_) => {
            error!("Simulation thread panicked");
            exit(1);
        }
    };

    postprocessing::postprocess(simulation_input, sim_output);
}
