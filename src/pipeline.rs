//! Per-camera ffmpeg command assembly.
//!
//! Combines the global and per-input ffmpeg settings with the resolved presets
//! into the argument list for one camera input. Nothing here runs ffmpeg.

use std::path::Path;

use crate::config::{ArgsValue, CameraConfig, CameraInput, Config, InputRole};
use crate::presets::PresetResolver;
use crate::restream::escape_credentials;

/// Directory recording segments are written to before they are moved.
pub const CACHE_DIR: &str = "/tmp/cache";

/// Local RTMP server restreamed cameras are pushed to.
pub const RTMP_BASE: &str = "rtmp://127.0.0.1/live";

/// The resolved preset, or the value's literal arguments when it names none.
fn preset_or_args(
    value: &ArgsValue,
    resolve: impl Fn(Option<&str>) -> Option<Vec<String>>,
) -> Vec<String> {
    resolve(value.preset()).unwrap_or_else(|| value.to_args())
}

/// Decode arguments: a per-input preset, else per-input raw args, else the
/// global preset, else the global raw args.
fn hwaccel_args(resolver: &PresetResolver, config: &Config, input: &CameraInput) -> Vec<String> {
    if let Some(value) = &input.hwaccel_args {
        if let Some(args) = resolver.decode(value.preset()) {
            return args;
        }
        let raw = value.to_args();
        if raw.iter().any(|a| !a.is_empty()) {
            return raw;
        }
    }
    preset_or_args(&config.ffmpeg.hwaccel_args, |p| resolver.decode(p))
}

fn input_args(
    resolver: &PresetResolver,
    config: &Config,
    camera: &CameraConfig,
    input: &CameraInput,
) -> Vec<String> {
    let fps = camera.detect.fps;
    if let Some(value) = &input.input_args {
        if let Some(args) = resolver.input(value.preset(), fps) {
            return args;
        }
        let raw = value.to_args();
        if raw.iter().any(|a| !a.is_empty()) {
            return raw;
        }
    }
    preset_or_args(&config.ffmpeg.input_args, |p| resolver.input(p, fps))
}

/// Output arguments for every role the input carries, record and rtmp ahead
/// of detect.
fn output_args(
    resolver: &PresetResolver,
    config: &Config,
    camera: &CameraConfig,
    input: &CameraInput,
) -> Vec<String> {
    let outputs = &config.ffmpeg.output_args;
    let mut args = Vec::new();

    if input.has_role(InputRole::Detect) {
        let detect = &camera.detect;
        args = resolver.scale(
            input
                .hwaccel_args
                .as_ref()
                .unwrap_or(&config.ffmpeg.hwaccel_args)
                .preset(),
            &outputs.detect.to_args(),
            detect.fps,
            detect.width,
            detect.height,
        );
        args.push("pipe:".to_string());
    }

    if input.has_role(InputRole::Record) && camera.record.enabled {
        let mut record = preset_or_args(&outputs.record, |p| resolver.record_output(p));
        let segment = Path::new(CACHE_DIR).join(format!("{}-%Y%m%d%H%M%S.mp4", camera.name));
        record.push(segment.to_string_lossy().into_owned());
        record.extend(args);
        args = record;
    }

    if input.has_role(InputRole::Rtmp) && camera.rtmp.enabled {
        let mut rtmp = preset_or_args(&outputs.rtmp, |p| resolver.rtmp_output(p));
        rtmp.push(format!("{}/{}", RTMP_BASE, camera.name));
        rtmp.extend(args);
        args = rtmp;
    }

    args
}

/// The ffmpeg argument list (program included) for one camera input, or
/// `None` when the input feeds no ffmpeg output. Restream-only inputs are
/// handled by go2rtc.
pub fn camera_command(
    resolver: &PresetResolver,
    config: &Config,
    camera: &CameraConfig,
    input: &CameraInput,
) -> Option<Vec<String>> {
    let outputs = output_args(resolver, config, camera, input);
    if outputs.is_empty() {
        return None;
    }

    let global = input
        .global_args
        .as_ref()
        .unwrap_or(&config.ffmpeg.global_args)
        .to_args();

    let mut cmd = vec!["ffmpeg".to_string()];
    cmd.extend(global);
    cmd.extend(hwaccel_args(resolver, config, input));
    cmd.extend(input_args(resolver, config, camera, input));
    cmd.push("-i".to_string());
    cmd.push(escape_credentials(&input.path));
    cmd.extend(outputs);

    cmd.retain(|part| !part.is_empty());
    Some(cmd)
}

/// Commands for every input of every camera, in declaration order.
pub fn all_commands(resolver: &PresetResolver, config: &Config) -> Vec<(String, Vec<String>)> {
    config
        .cameras
        .iter()
        .flat_map(|camera| {
            camera.ffmpeg.inputs.iter().filter_map(move |input| {
                camera_command(resolver, config, camera, input)
                    .map(|cmd| (camera.name.clone(), cmd))
            })
        })
        .collect()
}

/// Format an argument list for display, quoting where needed
pub fn format_cmd(cmd: &[String]) -> String {
    shlex::try_join(cmd.iter().map(String::as_str)).unwrap_or_else(|_| cmd.join(" "))
}
