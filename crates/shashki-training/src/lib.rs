//! Concurrent self-play training.
//!
//! [`pool`] is a fixed-size worker pool with a FIFO task queue, blocking
//! `wait_all`, pre-start cancellation and panic capture. [`tournament`]
//! schedules every (white, black) population pairing as an independent game
//! task on that pool, folds the outcomes into scores, and evolves each
//! side's population between rounds by top-k selection plus noise mutation.

pub use self::{pool::*, tournament::*};

pub mod pool;
pub mod tournament;
