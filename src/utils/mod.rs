pub mod coordinate;
pub mod export;
pub mod utils;
