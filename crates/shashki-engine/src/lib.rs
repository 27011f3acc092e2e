pub use self::{core::*, game::*};

pub mod core;
pub mod game;
