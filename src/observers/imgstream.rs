use std::{error::Error, fs, path::Path, sync::mpsc};

use plotters::prelude::*;
use tracing::debug;

use crate::ScalarField;

/// One field snapshot to be written as frame `i`
#[derive(Clone)]
pub struct DisplayPacket {
    pub field: ScalarField,
    pub i: usize,
}

/// Map a field onto 0..=254 grey levels, brightest at the field maximum.
/// An all-zero (or all-negative) field maps to black.
pub fn intensities(field: &ScalarField) -> Vec<u8> {
    let peak = field.max();
    let scale = if peak > 0. && peak.is_finite() { 254. / peak } else { 0. };

    field
        .iter()
        .map(|v| (v.max(0.) * scale).floor().min(254.) as u8)
        .collect()
}

/// Save a scalar field as a grayscale PNG, cell `(x, y)` becoming pixel `(x, y)`.
pub fn image_save(field: &ScalarField, filename: &str, frames_dir: &Path) -> Result<(), Box<dyn Error>> {
    let (width, height) = field.shape();

    let filename = frames_dir.join(filename);

    let root = BitMapBackend::new(&filename, (width as u32, height as u32)).into_drawing_area();
    root.fill(&BLACK)?;

    // storage is column-major over (x, y), so k = x + y * width
    for (k, pixel_intensity) in intensities(field).into_iter().enumerate() {
        let (x, y) = (k % width, k / width);
        let pixel_color = &RGBColor(pixel_intensity, pixel_intensity, pixel_intensity);

        root.draw_pixel((x as i32, y as i32), pixel_color)?;
    }
    root.present()?;

    Ok(())
}

/// Write every inbound packet to `frames_dir` until the sending side hangs up.
/// The directory is recreated first.
///
/// Returns
/// - The number of frames written
pub fn image_io_loop(
    inbound_fields: mpsc::Receiver<DisplayPacket>,
    frames_dir: &Path,
) -> Result<usize, Box<dyn Error>> {
    if frames_dir.exists() {
        fs::remove_dir_all(frames_dir)?;
    }
    fs::create_dir_all(frames_dir)?;

    let mut written = 0;
    while let Ok(inbound) = inbound_fields.recv() {
        image_save(&inbound.field, format!("{}.png", inbound.i).as_str(), frames_dir)?;
        written += 1;
    }

    debug!("Image writer finished after {written} frames");

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::{env, thread};

    use na::{DMatrix, dmatrix};

    use super::*;

    #[test]
    fn test_intensities() {
        let field: ScalarField = dmatrix![0., 2.; -1., 4.];

        // column-major: (0,0), (1,0), (0,1), (1,1)
        assert_eq!(intensities(&field), vec![0, 0, 127, 254]);
    }

    #[test]
    fn test_intensities_blank() {
        let field: ScalarField = DMatrix::zeros(3, 3);
        assert!(intensities(&field).iter().all(|v| *v == 0));
    }

    #[test]
    fn test_io_loop_writes_frames() {
        let frames_dir = env::temp_dir().join(format!("stable-fluids-frames-{}", std::process::id()));
        let (sender, receiver) = mpsc::channel();

        let dir = frames_dir.clone();
        let writer = thread::spawn(move || image_io_loop(receiver, &dir).map_err(|e| e.to_string()));

        for i in 0..3 {
            let field: ScalarField = DMatrix::from_fn(8, 6, |x, y| (x * y + i) as f32);
            sender.send(DisplayPacket { field, i }).unwrap();
        }
        drop(sender);

        assert_eq!(writer.join().unwrap(), Ok(3));
        assert!(frames_dir.join("2.png").is_file());

        let frame = image::open(frames_dir.join("0.png")).unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));

        fs::remove_dir_all(frames_dir).unwrap();
    }
}
