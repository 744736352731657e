pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod presets;
pub mod restream;
