pub use self::{controller::*, player::*, render::*, replay::*, turn::*};

pub(crate) mod controller;
pub(crate) mod player;
pub(crate) mod render;
pub(crate) mod replay;
pub(crate) mod turn;
