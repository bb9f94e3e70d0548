pub mod config;
pub mod map;

pub use config::ConfigCommand;
pub use map::MapCommand;
