use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::presets::PresetFamily;

#[derive(Parser)]
#[command(name = "ffrelay")]
#[command(about = "ffmpeg hwaccel preset resolver and go2rtc restream registrar", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recognized preset ids
    Presets {
        /// Only list one table
        #[arg(value_enum)]
        family: Option<PresetFamily>,
    },

    /// Print hardware decode arguments for a preset
    Decode {
        preset: String,
    },

    /// Print scale arguments for a preset
    Scale {
        preset: String,

        #[arg(long, default_value_t = 5)]
        fps: u32,

        #[arg(long, default_value_t = 1280)]
        width: u32,

        #[arg(long, default_value_t = 720)]
        height: u32,

        /// Detect output args appended when the preset has no scale row
        #[arg(long = "extra", value_name = "ARG", allow_hyphen_values = true)]
        extra: Vec<String>,
    },

    /// Print the encode command for a preset
    Encode {
        preset: String,

        /// Input clause, e.g. "-i in.mp4"
        #[arg(allow_hyphen_values = true)]
        input: String,

        /// Output clause, e.g. "out.mp4"
        #[arg(allow_hyphen_values = true)]
        output: String,

        /// Print one argument per line instead of the command string
        #[arg(long)]
        split: bool,
    },

    /// Print go2rtc's hardware engine for a preset
    Engine {
        preset: String,
    },

    /// Print input arguments for a preset
    Input {
        preset: String,

        /// Detect frame rate for presets that need one
        #[arg(long, default_value_t = 5)]
        fps: u32,
    },

    /// Print record output arguments for a preset
    Record {
        preset: String,
    },

    /// Print RTMP output arguments for a preset
    Rtmp {
        preset: String,
    },

    /// Show the go2rtc streams that would be registered (dry run)
    Relays {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register all streams with go2rtc
    Register {
        /// Override the relay API endpoint from the config
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },

    /// Show the ffmpeg command for every camera input
    Commands,

    /// Show config status and location, or create default config if missing
    InitConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
