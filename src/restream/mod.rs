//! go2rtc restream registration.
//!
//! Builds one source descriptor per restreamed camera (plus the optional
//! birdseye feed) and registers each with go2rtc. RTSP streams that need no
//! transcoding are relayed directly; everything else goes through go2rtc's
//! ffmpeg wrapper.

pub mod api;
pub mod descriptor;

use crate::config::{
    AudioCodec, BIRDSEYE_NAME, CameraConfig, CameraInput, Config, InputRole, VideoCodec,
};
use crate::error::RelayError;
use crate::presets::PresetResolver;

pub use api::{HttpRelayApi, RelayApi};
pub use descriptor::{Descriptor, SourceKind, escape_credentials, escape_special_characters};

/// Named pipe the birdseye compositor writes raw frames to.
pub const BIRDSEYE_PIPE: &str = "/tmp/cache/birdseye";

/// One stream to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEntry {
    pub name: String,
    pub descriptor: Descriptor,
}

/// True when go2rtc can relay the input without ffmpeg in between.
///
/// go2rtc only relays RTSP directly, and only when neither video nor audio
/// is re-encoded.
pub fn is_direct_relay(path: &str, video: VideoCodec, audio: &[AudioCodec]) -> bool {
    path.starts_with("rtsp") && video == VideoCodec::Copy && audio == [AudioCodec::Copy].as_slice()
}

/// Descriptor for a stream go2rtc pulls through its ffmpeg wrapper.
pub fn manual_stream(
    path: &str,
    audio: &[AudioCodec],
    video: VideoCodec,
    engine: Option<&str>,
) -> Descriptor {
    let mut stream = Descriptor::ffmpeg(path);

    for codec in audio {
        stream = stream.segment("audio", codec);
    }

    if video == VideoCodec::Copy {
        stream = stream.segment("video", "copy");
    } else {
        stream = stream.segment("video", video);
        if let Some(engine) = engine {
            stream = stream.segment("hardware", engine);
        }
    }

    stream
}

/// Ordered name → descriptor map where a repeated name replaces the earlier
/// descriptor in place.
#[derive(Debug, Default)]
struct RelayTable {
    entries: Vec<RelayEntry>,
}

impl RelayTable {
    fn insert(&mut self, name: &str, descriptor: Descriptor) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                tracing::debug!(camera = name, "replacing earlier restream input");
                existing.descriptor = descriptor;
            }
            None => self.entries.push(RelayEntry {
                name: name.to_string(),
                descriptor,
            }),
        }
    }
}

/// Builds and submits the relay descriptors for one configuration.
pub struct Restreamer<'a> {
    config: &'a Config,
    resolver: &'a PresetResolver,
}

impl<'a> Restreamer<'a> {
    pub fn new(config: &'a Config, resolver: &'a PresetResolver) -> Self {
        Self { config, resolver }
    }

    /// Descriptor for one restream input of a camera.
    pub fn camera_descriptor(&self, camera: &CameraConfig, input: &CameraInput) -> Descriptor {
        let restream = &camera.restream;

        if is_direct_relay(&input.path, restream.video_encoding, &restream.audio_encoding) {
            tracing::debug!(camera = %camera.name, "direct relay");
            return Descriptor::direct(&input.path).segment("backchannel", 0);
        }

        let engine = self
            .resolver
            .go2rtc_engine(self.config.ffmpeg.hwaccel_args.preset());
        tracing::debug!(camera = %camera.name, engine, "ffmpeg relay");
        manual_stream(
            &input.path,
            &restream.audio_encoding,
            restream.video_encoding,
            engine,
        )
    }

    /// `exec:` descriptor encoding the birdseye pipe, when birdseye restream
    /// is enabled.
    pub fn birdseye_descriptor(&self) -> Option<Descriptor> {
        if !self.config.restream.birdseye {
            return None;
        }

        let birdseye = &self.config.birdseye;
        let input = format!(
            "-f rawvideo -pix_fmt yuv420p -video_size {}x{} -r 10 -i {}",
            birdseye.width, birdseye.height, BIRDSEYE_PIPE
        );
        // {output} is filled in by go2rtc
        let output = "-rtsp_transport tcp -f rtsp {output}";
        let command = self
            .resolver
            .encode(self.config.ffmpeg.hwaccel_args.preset(), &input, output);

        Some(Descriptor::exec(command))
    }

    /// All streams to register, cameras in declaration order followed by
    /// birdseye.
    pub fn relays(&self) -> Vec<RelayEntry> {
        let mut table = RelayTable::default();

        for camera in &self.config.cameras {
            if !camera.restream.enabled {
                continue;
            }

            for input in camera
                .ffmpeg
                .inputs
                .iter()
                .filter(|i| i.has_role(InputRole::Restream))
            {
                table.insert(&camera.name, self.camera_descriptor(camera, input));
            }
        }

        if let Some(descriptor) = self.birdseye_descriptor() {
            table.insert(BIRDSEYE_NAME, descriptor);
        }

        table.entries
    }

    /// Register every stream with go2rtc.
    ///
    /// Stops at the first submission that could not be delivered; streams
    /// after it are not sent. A stream the relay answers with an error status
    /// does not stop the others.
    pub fn register_all(&self, api: &dyn RelayApi) -> Result<(), RelayError> {
        let relays = self.relays();
        tracing::info!(count = relays.len(), "registering restreams");

        for relay in relays {
            let src = relay.descriptor.to_string();
            tracing::info!(name = %relay.name, src = %src, "adding restream");
            api.put_stream(&relay.name, &src)?;
        }

        Ok(())
    }
}
