//! Board evaluation for the self-play trainer.
//!
//! Three layers, mirroring the engine/evaluation split:
//!
//! - [`encoding`] turns a board into the fixed one-hot feature vector a
//!   scoring model consumes, and back (for diagnostics and tests).
//! - [`model`] defines the opaque [`model::ScoringModel`] capability and the
//!   shipped [`model::LinearModel`].
//! - [`move_eval`] enumerates complete move plans from a move forest, scores
//!   the board each plan would produce, and wraps the result as a
//!   [`move_eval::ModelPlayer`] the engine's controller can drive.

pub use self::{encoding::*, model::*, move_eval::*};

pub mod encoding;
pub mod model;
pub mod move_eval;
