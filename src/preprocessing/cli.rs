use std::{error::Error, fs::File, io::BufReader, path::PathBuf};

use clap::{Parser, ValueEnum};
use tracing::info;

use crate::{
    preprocessing::{
        HeadlessSettings, ImageStreamSettings, InterfaceMode, SimulationInput,
        emitter::default_emitters,
    },
    sim::{FieldView, Preset, Viewport},
};

const DEFAULT_FRAMES_PATH: &str = "sim-frames";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Save PNG frames and optionally play them back
    Video,
    /// Only log diagnostics
    Headless,
}

// Raw, CLI input
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[arg(long, help = "An input file with pre-loaded parameters.")]
    input_json: Option<PathBuf>,

    #[arg(long, help = "Optional path to save the resolved input file to.")]
    pub input_json_savepath: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "video", help = "What to do with the solution.")]
    mode: Mode,

    #[arg(long, help = "An optional directory where frames should be saved.")]
    frames_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Whether or not frames should be retained after playback.",
        default_value = "false"
    )]
    retain_frames: bool,

    #[arg(
        short,
        long,
        help = "Whether the frame animation should play after solving."
    )]
    display_video: bool,

    #[arg(long, default_value = "1", help = "Steps between saved frames.")]
    frame_interval: usize,

    #[arg(long, value_enum, default_value = "density", help = "Field written to frames.")]
    view: FieldView,

    #[arg(long, default_value = "25", help = "Steps between logged diagnostics in headless mode.")]
    log_interval: usize,

    #[arg(short = 'n', long, default_value = "128", help = "Grid cells per side.")]
    grid_size: usize,

    #[arg(short, long, default_value = "600", help = "Number of steps to simulate.")]
    steps: usize,

    #[arg(long, help = "Seed for the initial dye; random if omitted.")]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "default", help = "Starting parameter set.")]
    preset: Preset,

    #[arg(long, help = "Time step. Overrides the preset.")]
    dt: Option<f32>,

    #[arg(long, help = "Dye diffusion rate. Overrides the preset.")]
    diffusion: Option<f32>,

    #[arg(long, help = "Viscosity. Overrides the preset.")]
    viscosity: Option<f32>,

    #[arg(long, help = "Relaxation sweeps per solve. Overrides the preset.")]
    iterations: Option<usize>,

    #[arg(long, help = "Per-step density multiplier in (0, 1]. Overrides the preset.")]
    density_dissipation: Option<f32>,

    #[arg(long, help = "Per-step velocity multiplier in (0, 1]. Overrides the preset.")]
    velocity_dissipation: Option<f32>,

    #[arg(long, help = "Force scale. Overrides the preset.")]
    force_multiplier: Option<f32>,

    #[arg(long, help = "Force radius in cells. Overrides the preset.")]
    force_radius: Option<f32>,

    #[arg(long, default_value = "800.0", help = "Width of the coordinate space forces are given in.")]
    viewport_width: f32,

    #[arg(long, default_value = "800.0", help = "Height of the coordinate space forces are given in.")]
    viewport_height: f32,

    #[arg(short, long, help = "Log at debug level.")]
    pub verbose: bool,
}

impl CliArgs {
    /// Resolve the arguments (or the input file they point at) into a validated input
    pub fn create_input(&self) -> Result<SimulationInput, Box<dyn Error>> {
        let input = match &self.input_json {
            Some(input_filepath) => {
                if !input_filepath.is_file() {
                    return Err(format!("Input file {:?} is not a file.", input_filepath).into());
                }

                info!("Using input file {}", input_filepath.display());

                let reader = BufReader::new(File::open(input_filepath)?);
                serde_json::from_reader(reader)?
            }
            None => self.input_from_args(),
        };

        input.validate()?;
        Ok(input)
    }

    fn input_from_args(&self) -> SimulationInput {
        let mode = match self.mode {
            Mode::Video => InterfaceMode::ImageStream(ImageStreamSettings {
                frames_dir: self
                    .frames_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_FRAMES_PATH)),
                retain_frames: self.retain_frames,
                display_video: self.display_video,
                frame_interval: self.frame_interval.max(1),
                view: self.view,
            }),
            Mode::Headless => InterfaceMode::Headless(HeadlessSettings {
                log_interval: self.log_interval.max(1),
            }),
        };

        let mut config = self.preset.config();
        config.dt = self.dt.unwrap_or(config.dt);
        config.diffusion = self.diffusion.unwrap_or(config.diffusion);
        config.viscosity = self.viscosity.unwrap_or(config.viscosity);
        config.iterations = self.iterations.unwrap_or(config.iterations);
        config.density_dissipation = self.density_dissipation.unwrap_or(config.density_dissipation);
        config.velocity_dissipation = self
            .velocity_dissipation
            .unwrap_or(config.velocity_dissipation);
        config.force_multiplier = self.force_multiplier.unwrap_or(config.force_multiplier);
        config.force_radius = self.force_radius.unwrap_or(config.force_radius);

        let viewport = Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        };

        SimulationInput {
            mode,
            grid_size: self.grid_size,
            steps: self.steps,
            seed: self.seed,
            config,
            viewport,
            emitters: default_emitters(viewport),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;
    use crate::sim::FluidConfig;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["stable-fluids"]);
        let input = args.create_input().unwrap();

        assert_eq!(input.grid_size, 128);
        assert_eq!(input.config, FluidConfig::default());
        assert_eq!(input.emitters.len(), 2);
        match input.mode {
            InterfaceMode::ImageStream(settings) => {
                assert_eq!(settings.frames_dir, PathBuf::from(DEFAULT_FRAMES_PATH));
                assert_eq!(settings.view, FieldView::Density);
                assert!(!settings.display_video);
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_preset_with_overrides() {
        let args = CliArgs::parse_from([
            "stable-fluids",
            "--preset",
            "syrup",
            "--iterations",
            "7",
            "--dt",
            "0.05",
            "--mode",
            "headless",
            "-n",
            "48",
        ]);
        let input = args.create_input().unwrap();

        let syrup = Preset::Syrup.config();
        assert_eq!(input.config.iterations, 7);
        assert_eq!(input.config.dt, 0.05);
        assert_eq!(input.config.viscosity, syrup.viscosity);
        assert_eq!(input.grid_size, 48);
        assert!(matches!(input.mode, InterfaceMode::Headless(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        let args = CliArgs::parse_from(["stable-fluids", "--grid-size", "2"]);
        assert!(args.create_input().is_err());

        let args = CliArgs::parse_from(["stable-fluids", "--velocity-dissipation", "1.5"]);
        assert!(args.create_input().is_err());

        let args = CliArgs::parse_from(["stable-fluids", "--viewport-width", "0"]);
        assert!(args.create_input().is_err());
    }

    #[test]
    fn test_input_file() {
        let expected = CliArgs::parse_from(["stable-fluids", "--seed", "12", "--view", "velocity"])
            .create_input()
            .unwrap();

        let path = env::temp_dir().join(format!("stable-fluids-input-{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string(&expected).unwrap()).unwrap();

        let args = CliArgs::parse_from([
            "stable-fluids",
            "--input-json",
            path.to_str().unwrap(),
            "--grid-size",
            "3",
        ]);
        let loaded = args.create_input().unwrap();
        fs::remove_file(&path).unwrap();

        // the file wins over other arguments
        assert_eq!(expected, loaded);
    }

    #[test]
    fn test_missing_input_file() {
        let args = CliArgs::parse_from(["stable-fluids", "--input-json", "/nonexistent/input.json"]);
        assert!(args.create_input().is_err());
    }
}
