pub mod attacks;
pub mod board;
pub mod clock;
pub mod draw;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod types;

pub use board::Board;
pub use game::{Game, PromotionPrompt};
pub use movegen::legal_moves;
pub use types::*;
