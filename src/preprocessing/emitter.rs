// Scripted force sources standing in for pointer input

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::sim::force::Viewport;

/// One `add_force` call, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub x: f32,
    pub y: f32,
    pub amount_x: f32,
    pub amount_y: f32,
}

/// A source of one impulse per step while active.
///
/// `start` is the first step the emitter fires on, `stop` (if any) the first
/// step it no longer does.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Emitter {
    /// A fixed nozzle pushing in one direction
    Jet {
        position: (f32, f32),
        force: (f32, f32),
        #[serde(default)]
        start: usize,
        #[serde(default)]
        stop: Option<usize>,
    },

    /// A point circling `center`, pushing along its direction of travel like
    /// a dragged pointer
    Orbit {
        center: (f32, f32),
        radius: f32,
        /// Steps per revolution
        period: f32,
        strength: f32,
        #[serde(default)]
        start: usize,
        #[serde(default)]
        stop: Option<usize>,
    },
}

impl Emitter {
    /// The impulse this emitter produces on `step`, if it is active
    pub fn impulse(&self, step: usize) -> Option<Impulse> {
        match *self {
            Emitter::Jet {
                position,
                force,
                start,
                stop,
            } => active(step, start, stop).then_some(Impulse {
                x: position.0,
                y: position.1,
                amount_x: force.0,
                amount_y: force.1,
            }),
            Emitter::Orbit {
                center,
                radius,
                period,
                strength,
                start,
                stop,
            } => {
                if !active(step, start, stop) || period <= 0. {
                    return None;
                }

                let angle = TAU * (step - start) as f32 / period;
                let (sin, cos) = angle.sin_cos();

                Some(Impulse {
                    x: center.0 + radius * cos,
                    y: center.1 + radius * sin,
                    amount_x: -strength * sin,
                    amount_y: strength * cos,
                })
            }
        }
    }
}

fn active(step: usize, start: usize, stop: Option<usize>) -> bool {
    step >= start && stop.is_none_or(|stop| step < stop)
}

/// A stirrer circling the middle of the viewport plus a jet rising from the
/// bottom edge.
pub fn default_emitters(viewport: Viewport) -> Vec<Emitter> {
    let (w, h) = (viewport.width, viewport.height);

    vec![
        Emitter::Orbit {
            center: (0.5 * w, 0.5 * h),
            radius: 0.25 * w.min(h),
            period: 240.,
            strength: 1.,
            start: 0,
            stop: None,
        },
        Emitter::Jet {
            position: (0.5 * w, 0.95 * h),
            force: (0., -2.),
            start: 0,
            stop: Some(120),
        },
    ]
}
