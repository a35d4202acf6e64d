mod catalog;
mod playlist;

pub use catalog::*;
pub use playlist::*;
