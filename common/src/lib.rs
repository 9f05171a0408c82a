pub mod messages;
mod snakeladder;

pub use snakeladder::*;
