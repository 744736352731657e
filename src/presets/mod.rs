//! Hardware acceleration preset resolver.
//!
//! Maps symbolic preset ids (`preset-vaapi`, `preset-nvidia-h264`, ...) to the
//! ffmpeg argument fragments for each point in the pipeline. Every table has
//! its own fallback policy, captured by [`PresetFamily::fallback`]:
//!
//! - decode, input, record and rtmp presets are opt-in: a miss yields nothing.
//! - scale and encode presets are always required: a miss uses `default`.
//! - relay engine hints have no default: a miss yields no hint.
//!
//! Resolution never fails. A preset that is not a string (an explicit argument
//! list in the config) is passed in as `None`.

pub mod tables;
pub mod template;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub use tables::{DEFAULT_KEY, Entry};
pub use template::Template;

/// Directory of the BtbN static ffmpeg build, which renamed `-stimeout`.
pub const BTBN_PATH: &str = "/usr/lib/btbn-ffmpeg";

/// The independent preset tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum PresetFamily {
    Decode,
    Scale,
    Encode,
    #[value(name = "go2rtc-engine")]
    Go2rtcEngine,
    Input,
    RecordOutput,
    RtmpOutput,
}

/// What a table does when the key is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Nothing is returned.
    Absent,
    /// The row stored under the given key is used.
    Row(&'static str),
}

impl PresetFamily {
    pub const ALL: [PresetFamily; 7] = [
        PresetFamily::Decode,
        PresetFamily::Scale,
        PresetFamily::Encode,
        PresetFamily::Go2rtcEngine,
        PresetFamily::Input,
        PresetFamily::RecordOutput,
        PresetFamily::RtmpOutput,
    ];

    pub fn fallback(self) -> Fallback {
        match self {
            PresetFamily::Scale | PresetFamily::Encode => Fallback::Row(DEFAULT_KEY),
            PresetFamily::Decode
            | PresetFamily::Go2rtcEngine
            | PresetFamily::Input
            | PresetFamily::RecordOutput
            | PresetFamily::RtmpOutput => Fallback::Absent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PresetFamily::Decode => "decode",
            PresetFamily::Scale => "scale",
            PresetFamily::Encode => "encode",
            PresetFamily::Go2rtcEngine => "go2rtc-engine",
            PresetFamily::Input => "input",
            PresetFamily::RecordOutput => "record-output",
            PresetFamily::RtmpOutput => "rtmp-output",
        }
    }

    fn rows(self, options: &PresetOptions) -> Vec<(&'static str, Entry)> {
        match self {
            PresetFamily::Decode => tables::decode_rows(),
            PresetFamily::Scale => tables::scale_rows(),
            PresetFamily::Encode => tables::encode_rows(),
            PresetFamily::Go2rtcEngine => tables::go2rtc_engine_rows(),
            PresetFamily::Input => tables::input_rows(options),
            PresetFamily::RecordOutput => tables::record_output_rows(),
            PresetFamily::RtmpOutput => tables::rtmp_output_rows(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PresetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a table lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The preset id has its own row.
    Matched(T),
    /// The preset id was unknown and the table's default row was used.
    Defaulted(T),
    /// The preset id was unknown and the table has no default.
    Absent,
}

impl<T> Resolution<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Resolution::Defaulted(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolution::Absent)
    }

    /// Drop the matched/defaulted distinction.
    pub fn into_option(self) -> Option<T> {
        match self {
            Resolution::Matched(v) | Resolution::Defaulted(v) => Some(v),
            Resolution::Absent => None,
        }
    }
}

/// Flag ffmpeg uses for the RTSP socket timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutFlag {
    /// `-timeout`, used by newer builds.
    Timeout,
    /// `-stimeout`, used by older builds.
    Stimeout,
}

impl TimeoutFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeoutFlag::Timeout => "-timeout",
            TimeoutFlag::Stimeout => "-stimeout",
        }
    }

    /// Pick the flag for the ffmpeg build installed on this host.
    pub fn detect() -> Self {
        Self::for_btbn_dir(Path::new(BTBN_PATH))
    }

    pub fn for_btbn_dir(dir: &Path) -> Self {
        if dir.exists() {
            TimeoutFlag::Timeout
        } else {
            TimeoutFlag::Stimeout
        }
    }
}

/// Host-dependent values baked into the input presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetOptions {
    pub user_agent: String,
    pub timeout_flag: TimeoutFlag,
}

pub fn default_user_agent() -> String {
    format!("FFmpeg ffrelay/{}", env!("CARGO_PKG_VERSION"))
}

impl PresetOptions {
    pub fn detect() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_flag: TimeoutFlag::detect(),
        }
    }
}

/// One family's rows, keyed by preset id.
#[derive(Debug, Clone)]
pub struct PresetTable {
    family: PresetFamily,
    rows: HashMap<&'static str, Entry>,
}

impl PresetTable {
    fn build(family: PresetFamily, options: &PresetOptions) -> Self {
        Self {
            family,
            rows: family.rows(options).into_iter().collect(),
        }
    }

    /// Exact row lookup, no fallback.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.rows.get(key)
    }

    /// Lookup applying the family's fallback policy.
    pub fn lookup(&self, preset: Option<&str>) -> Resolution<&Entry> {
        if let Some(entry) = preset.and_then(|key| self.rows.get(key)) {
            return Resolution::Matched(entry);
        }
        match self.family.fallback() {
            Fallback::Row(key) => match self.rows.get(key) {
                Some(entry) => Resolution::Defaulted(entry),
                None => Resolution::Absent,
            },
            Fallback::Absent => Resolution::Absent,
        }
    }

    /// Recognized preset ids, sorted, without the fallback row.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .rows
            .keys()
            .copied()
            .filter(|k| *k != DEFAULT_KEY)
            .collect();
        names.sort_unstable();
        names
    }

    fn default_template(&self) -> Option<&Template> {
        match self.rows.get(DEFAULT_KEY) {
            Some(Entry::Template(t)) => Some(t),
            _ => None,
        }
    }
}

static GLOBAL: OnceLock<PresetResolver> = OnceLock::new();

/// All preset tables, built once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct PresetResolver {
    tables: Vec<PresetTable>,
    options: PresetOptions,
}

impl Default for PresetResolver {
    fn default() -> Self {
        Self::new(PresetOptions::detect())
    }
}

impl PresetResolver {
    pub fn new(options: PresetOptions) -> Self {
        let tables = PresetFamily::ALL
            .iter()
            .map(|family| PresetTable::build(*family, &options))
            .collect();
        Self { tables, options }
    }

    /// Process-wide resolver, built from host detection on first use.
    pub fn global() -> &'static PresetResolver {
        GLOBAL.get_or_init(PresetResolver::default)
    }

    /// Build the process-wide resolver with explicit options.
    ///
    /// Has no effect if the resolver was already built; the existing one is
    /// returned.
    pub fn init_global(options: PresetOptions) -> &'static PresetResolver {
        GLOBAL.get_or_init(|| PresetResolver::new(options))
    }

    pub fn options(&self) -> &PresetOptions {
        &self.options
    }

    pub fn table(&self, family: PresetFamily) -> &PresetTable {
        &self.tables[family.index()]
    }

    pub fn lookup(&self, family: PresetFamily, preset: Option<&str>) -> Resolution<&Entry> {
        self.table(family).lookup(preset)
    }

    pub fn preset_names(&self, family: PresetFamily) -> Vec<&'static str> {
        self.table(family).names()
    }

    /// Hardware decode flags for the preset, if it has any.
    pub fn decode(&self, preset: Option<&str>) -> Option<Vec<String>> {
        fragment(self.lookup(PresetFamily::Decode, preset))
    }

    /// Scale and pixel format arguments for the detect stream.
    ///
    /// `detect_args` is only appended when the preset has no row of its own.
    /// A value containing a space is an argument string rather than a preset
    /// id and is treated like no preset at all.
    pub fn scale(
        &self,
        preset: Option<&str>,
        detect_args: &[String],
        fps: u32,
        width: u32,
        height: u32,
    ) -> Vec<String> {
        let table = self.table(PresetFamily::Scale);
        let values: [&dyn fmt::Display; 3] = [&fps, &width, &height];

        let preset = match preset {
            Some(p) if !p.contains(' ') => p,
            _ => {
                let mut scale = table
                    .default_template()
                    .map(|t| t.render_tokens(&values))
                    .unwrap_or_default();
                scale.extend_from_slice(detect_args);
                return scale;
            }
        };

        match table.get(preset) {
            Some(Entry::Template(t)) => t.render_tokens(&values),
            Some(Entry::Fragment(args)) => args.clone(),
            _ => {
                tracing::debug!(preset, "no scale preset, using detect args only");
                detect_args.to_vec()
            }
        }
    }

    /// Full encode command line with the input and output clauses filled in.
    pub fn encode(&self, preset: Option<&str>, input: &str, output: &str) -> String {
        match self.lookup(PresetFamily::Encode, preset) {
            Resolution::Matched(Entry::Template(t)) | Resolution::Defaulted(Entry::Template(t)) => {
                t.render(&[&input, &output])
            }
            _ => format!("{input} {output}"),
        }
    }

    /// [`encode`](Self::encode) split into arguments with shell quoting rules.
    pub fn encode_args(&self, preset: Option<&str>, input: &str, output: &str) -> Vec<String> {
        let command = self.encode(preset, input, output);
        shlex::split(&command)
            .unwrap_or_else(|| command.split_whitespace().map(str::to_string).collect())
    }

    /// go2rtc's name for the hardware engine behind the preset.
    pub fn go2rtc_engine(&self, preset: Option<&str>) -> Option<&'static str> {
        match self.lookup(PresetFamily::Go2rtcEngine, preset) {
            Resolution::Matched(Entry::Engine(name)) => Some(*name),
            _ => None,
        }
    }

    /// Input arguments for the preset, with the frame rate filled in where
    /// the preset asks for one.
    ///
    /// Only the value of the first `-r` flag is substituted; the same token
    /// elsewhere (a user agent of `{}`, say) is left alone.
    pub fn input(&self, preset: Option<&str>, detect_fps: u32) -> Option<Vec<String>> {
        fragment(self.lookup(PresetFamily::Input, preset)).map(|mut args| {
            let slot = args
                .windows(2)
                .position(|pair| pair[0] == "-r" && pair[1] == tables::FPS_TOKEN);
            if let Some(i) = slot {
                args[i + 1] = detect_fps.to_string();
            }
            args
        })
    }

    pub fn record_output(&self, preset: Option<&str>) -> Option<Vec<String>> {
        fragment(self.lookup(PresetFamily::RecordOutput, preset))
    }

    pub fn rtmp_output(&self, preset: Option<&str>) -> Option<Vec<String>> {
        fragment(self.lookup(PresetFamily::RtmpOutput, preset))
    }
}

fn fragment(resolution: Resolution<&Entry>) -> Option<Vec<String>> {
    match resolution.into_option() {
        Some(Entry::Fragment(args)) => Some(args.clone()),
        _ => None,
    }
}
