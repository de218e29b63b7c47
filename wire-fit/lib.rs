//! Parabola fitting and arc-length calculation for suspended wires.
//!
//! [`fit_parabola`] fits `y = a*x^2 + b*x + c` to wire samples in pixel space
//! by least squares and reports the vertex and pixel sag. [`calculate_arc_length`]
//! rescales three key points to meters, fits the exact parabola through them
//! and integrates its length. [`measure`] combines both into the values shown
//! to the user.

pub mod catenary;
pub mod chord;
pub mod error;
pub mod measurement;
pub mod parabola;
pub mod solver;

pub use catenary::{calculate_arc_length, fit_through_origin, parabola_arc_length, ArcLength};
pub use chord::{chord_sag, chord_slope};
pub use error::{FitError, FitOutcome};
pub use measurement::{measure, Measurement};
pub use parabola::{fit_model, fit_parabola, residual_sum_of_squares};
pub use solver::solve_3x3;
