// Handles frame playback post-solve

use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use minifb::{Key, Window, WindowOptions};
use ndarray::Array1;
use screen_size::get_primary_screen_size as get_screen_size;
use tracing::debug;

/// Frames held in memory for playback; longer runs are subsampled evenly
pub const MAX_PLAYBACK_FRAMES: usize = 600;

/// Screen width assumed when it cannot be queried
const FALLBACK_SCREEN_WIDTH: u64 = 1280;

/// The numbered PNG frames in `frames_dir`, ordered by frame index
pub fn frame_paths(frames_dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut frames: Vec<(usize, PathBuf)> = fs::read_dir(frames_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("png"))
        .filter_map(|p| {
            let idx = p
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<usize>().ok())?;
            Some((idx, p))
        })
        .collect();

    frames.sort_by_key(|(idx, _)| *idx);

    Ok(frames.into_iter().map(|(_, p)| p).collect())
}

/// Evenly spaced positions into a list of `available` frames, at most `budget` long
pub fn sample_indices(available: usize, budget: usize) -> Vec<usize> {
    let count = available.min(budget);
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![0];
    }

    Array1::linspace(0., (available - 1) as f64, count)
        .iter()
        .map(|t| t.round() as usize)
        .collect()
}

/// Open a window and loop the saved frames at `fps` until it is closed or
/// Escape is pressed.
///
/// Parameters
/// - `fps` - The desired *video* frames per second
/// - `frames_dir` - The directory that contains the frames (png images) to animate.
pub fn play_video(fps: usize, frames_dir: &Path) -> Result<(), Box<dyn Error>> {
    let paths = frame_paths(frames_dir)?;
    if paths.is_empty() {
        return Err("no PNG frames found".into());
    }

    let selected = sample_indices(paths.len(), MAX_PLAYBACK_FRAMES);
    debug!("Playing {} of {} frames", selected.len(), paths.len());

    let originals: Vec<DynamicImage> = selected
        .iter()
        .map(|&k| image::open(&paths[k]))
        .collect::<Result<_, _>>()?;

    // size the window to half the screen width, keeping the grid's aspect
    let (w, h) = originals[0].dimensions();
    let screen_w = get_screen_size()
        .map(|(w, _)| w as u64)
        .unwrap_or(FALLBACK_SCREEN_WIDTH);
    let init_w = screen_w / 2;
    let init_h = (init_w as f32 * (h as f32 / w as f32)) as u64;

    let mut window = Window::new(
        "Stable Fluids",
        init_w as usize,
        init_h as usize,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;

    let fps = fps.max(1);
    let frame_time = Duration::from_secs_f64(1.0 / fps as f64);
    let start = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let (win_w, win_h) = window.get_size();
        let elapsed = Instant::now().duration_since(start);
        let tick = (elapsed.as_secs_f64() * fps as f64) as usize;
        let idx = tick % originals.len();

        // nearest-neighbour keeps the grid cells crisp
        let img = originals[idx]
            .resize_exact(win_w as u32, win_h as u32, FilterType::Nearest)
            .to_rgba8();

        let buffer: Vec<u32> = img
            .pixels()
            .map(|px| {
                ((px[3] as u32) << 24)
                    | ((px[0] as u32) << 16)
                    | ((px[1] as u32) << 8)
                    | (px[2] as u32)
            })
            .collect();

        window.update_with_buffer(&buffer, win_w, win_h)?;

        // throttle to fps
        let next = start + frame_time * (tick + 1) as u32;
        if let Some(d) = next.checked_duration_since(Instant::now()) {
            std::thread::sleep(d);
        }
    }

    Ok(())
}
