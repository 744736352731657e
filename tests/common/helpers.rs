#![allow(dead_code)]

use std::cell::RefCell;

use ffrelay::config::{
    AudioCodec, CameraConfig, CameraFfmpegConfig, CameraInput, CameraRestreamConfig, Config,
    InputRole, RecordConfig, VideoCodec,
};
use ffrelay::error::RelayError;
use ffrelay::presets::{PresetOptions, PresetResolver, TimeoutFlag};
use ffrelay::restream::RelayApi;

pub const TEST_USER_AGENT: &str = "FFmpeg ffrelay-test/0.0";

/// Resolver with fixed options so output doesn't depend on the host
pub fn test_resolver() -> PresetResolver {
    test_resolver_with(TimeoutFlag::Timeout)
}

pub fn test_resolver_with(timeout_flag: TimeoutFlag) -> PresetResolver {
    PresetResolver::new(PresetOptions {
        user_agent: TEST_USER_AGENT.to_string(),
        timeout_flag,
    })
}

pub fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn input(path: &str, roles: &[InputRole]) -> CameraInput {
    CameraInput {
        path: path.to_string(),
        roles: roles.to_vec(),
        global_args: None,
        hwaccel_args: None,
        input_args: None,
    }
}

pub fn camera(name: &str, inputs: Vec<CameraInput>) -> CameraConfig {
    CameraConfig {
        name: name.to_string(),
        ffmpeg: CameraFfmpegConfig { inputs },
        restream: CameraRestreamConfig::default(),
        detect: Default::default(),
        record: RecordConfig { enabled: true },
        rtmp: Default::default(),
    }
}

/// Camera with a single restream input and the given encodings
pub fn restream_camera(
    name: &str,
    path: &str,
    video: VideoCodec,
    audio: &[AudioCodec],
) -> CameraConfig {
    let mut cam = camera(name, vec![input(path, &[InputRole::Restream])]);
    cam.restream.video_encoding = video;
    cam.restream.audio_encoding = audio.to_vec();
    cam
}

pub fn config_with(cameras: Vec<CameraConfig>) -> Config {
    Config {
        cameras,
        ..Config::default()
    }
}

/// A send error raised before any connection is made
pub fn undeliverable() -> reqwest::Error {
    reqwest::blocking::Client::new()
        .put("http://")
        .send()
        .unwrap_err()
}

/// In-memory relay API that records every submission
#[derive(Default)]
pub struct RecordingApi {
    pub calls: RefCell<Vec<(String, String)>>,
    pub unreachable: Option<&'static str>,
}

impl RecordingApi {
    /// Fails to deliver the stream `name`, as if the relay were down
    pub fn failing_on(name: &'static str) -> Self {
        Self {
            calls: RefCell::default(),
            unreachable: Some(name),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn src_for(&self, name: &str) -> Option<String> {
        self.calls
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, src)| src.clone())
    }
}

impl RelayApi for RecordingApi {
    fn put_stream(&self, name: &str, src: &str) -> Result<(), RelayError> {
        if self.unreachable == Some(name) {
            return Err(RelayError::Request {
                name: name.to_string(),
                source: undeliverable(),
            });
        }

        self.calls
            .borrow_mut()
            .push((name.to_string(), src.to_string()));
        Ok(())
    }
}
