pub mod data;
pub mod io;

pub use data::{path_display, Config, ConfigOverrides, DEFAULT_HOST, DEFAULT_PORT};
pub use io::ConfigError;
