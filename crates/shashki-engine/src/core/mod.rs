pub use self::{board::*, cell::*, move_tree::*, piece::*};

pub(crate) mod board;
pub(crate) mod cell;
pub(crate) mod move_tree;
pub(crate) mod piece;
