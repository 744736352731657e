//! Static preset definitions.
//!
//! Each function returns the rows of one table. Rows are turned into a
//! [`PresetTable`](super::PresetTable) once when the resolver is built.

use super::template::Template;
use super::PresetOptions;

/// Key of the fallback row in tables that carry one.
pub const DEFAULT_KEY: &str = "default";

/// Token replaced by the detect frame rate in input presets.
pub const FPS_TOKEN: &str = "{}";

/// One row value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Literal argument fragment, returned as-is.
    Fragment(Vec<String>),
    /// Template needing positional substitution.
    Template(Template),
    /// Relay-side engine name.
    Engine(&'static str),
}

fn frag(args: &[&str]) -> Entry {
    Entry::Fragment(args.iter().map(|s| s.to_string()).collect())
}

fn frag_with(prefix: &[String], args: &[&str]) -> Entry {
    let mut out = prefix.to_vec();
    out.extend(args.iter().map(|s| s.to_string()));
    Entry::Fragment(out)
}

pub fn decode_rows() -> Vec<(&'static str, Entry)> {
    let cuda = |codec: &str| {
        frag(&[
            "-hwaccel",
            "cuda",
            "-hwaccel_output_format",
            "cuda",
            "-extra_hw_frames",
            "2",
            "-c:v",
            codec,
        ])
    };

    vec![
        ("preset-rpi-32-h264", frag(&["-c:v", "h264_v4l2m2m"])),
        ("preset-rpi-64-h264", frag(&["-c:v", "h264_v4l2m2m"])),
        (
            "preset-vaapi",
            frag(&[
                "-hwaccel_flags",
                "allow_profile_mismatch",
                "-hwaccel",
                "vaapi",
                "-hwaccel_device",
                "/dev/dri/renderD128",
                "-hwaccel_output_format",
                "vaapi",
            ]),
        ),
        (
            "preset-intel-qsv-h264",
            frag(&[
                "-hwaccel",
                "qsv",
                "-qsv_device",
                "/dev/dri/renderD128",
                "-hwaccel_output_format",
                "qsv",
                "-c:v",
                "h264_qsv",
            ]),
        ),
        (
            "preset-intel-qsv-h265",
            frag(&[
                "-load_plugin",
                "hevc_hw",
                "-hwaccel",
                "qsv",
                "-qsv_device",
                "/dev/dri/renderD128",
                "-hwaccel_output_format",
                "qsv",
                "-c:v",
                "hevc_qsv",
            ]),
        ),
        ("preset-nvidia-h264", cuda("h264_cuvid")),
        ("preset-nvidia-h265", cuda("hevc_cuvid")),
        ("preset-nvidia-mjpeg", cuda("mjpeg_cuvid")),
    ]
}

pub fn scale_rows() -> Vec<(&'static str, Entry)> {
    const RPI: &str = "-r {} -s {}x{} -f rawvideo -pix_fmt yuv420p";
    const QSV: &str = "-r {} -vf vpp_qsv=w={}:h={}:format=nv12,hwdownload,format=nv12,format=yuv420p -f rawvideo";
    const CUDA: &str = "-vf fps={},scale_cuda=w={}:h={}:format=nv12,hwdownload,format=nv12,format=yuv420p -f rawvideo";

    vec![
        ("preset-rpi-32-h264", Entry::Template(Template::new(RPI))),
        ("preset-rpi-64-h264", Entry::Template(Template::new(RPI))),
        (
            "preset-vaapi",
            Entry::Template(Template::new(
                "-vf fps={},scale_vaapi=w={}:h={},hwdownload,format=yuv420p -f rawvideo",
            )),
        ),
        ("preset-intel-qsv-h264", Entry::Template(Template::new(QSV))),
        ("preset-intel-qsv-h265", Entry::Template(Template::new(QSV))),
        ("preset-nvidia-h264", Entry::Template(Template::new(CUDA))),
        ("preset-nvidia-h265", Entry::Template(Template::new(CUDA))),
        (DEFAULT_KEY, Entry::Template(Template::new("-r {} -s {}x{}"))),
    ]
}

pub fn encode_rows() -> Vec<(&'static str, Entry)> {
    const RPI: &str = "ffmpeg -hide_banner {0} -c:v h264_v4l2m2m -g 50 -bf 0 {1}";
    // QSV h265 still encodes h264 for browser compatibility.
    const QSV: &str = "ffmpeg -hide_banner {0} -c:v h264_qsv -g 50 -bf 0 -profile:v high -level:v 4.1 -async_depth:v 1 {1}";
    const NVENC: &str = "ffmpeg -hide_banner {0} -c:v h264_nvenc -g 50 -profile:v high -level:v auto -preset:v p2 -tune:v ll {1}";

    vec![
        ("preset-rpi-32-h264", Entry::Template(Template::new(RPI))),
        ("preset-rpi-64-h264", Entry::Template(Template::new(RPI))),
        ("preset-intel-qsv-h264", Entry::Template(Template::new(QSV))),
        ("preset-intel-qsv-h265", Entry::Template(Template::new(QSV))),
        ("preset-nvidia-h264", Entry::Template(Template::new(NVENC))),
        ("preset-nvidia-h265", Entry::Template(Template::new(NVENC))),
        (
            DEFAULT_KEY,
            Entry::Template(Template::new(
                "ffmpeg -hide_banner {0} -c:v libx264 -g 50 -profile:v high -level:v 4.1 -preset:v superfast -tune:v zerolatency {1}",
            )),
        ),
    ]
}

pub fn go2rtc_engine_rows() -> Vec<(&'static str, Entry)> {
    vec![
        ("preset-rpi-32-h264", Entry::Engine("v4l2m2m")),
        ("preset-rpi-64-h264", Entry::Engine("v4l2m2m")),
        ("preset-intel-vaapi", Entry::Engine("vaapi")),
        // go2rtc has no qsv engine
        ("preset-intel-qsv-h264", Entry::Engine("vaapi")),
        ("preset-intel-qsv-h265", Entry::Engine("vaapi")),
        ("preset-amd-vaapi", Entry::Engine("vaapi")),
        ("preset-nvidia-h264", Entry::Engine("cuda")),
        ("preset-nvidia-h265", Entry::Engine("cuda")),
    ]
}

pub fn input_rows(options: &PresetOptions) -> Vec<(&'static str, Entry)> {
    let agent = vec!["-user_agent".to_string(), options.user_agent.clone()];
    let timeout = options.timeout_flag.as_str();

    vec![
        (
            "preset-http-jpeg-generic",
            frag_with(
                &agent,
                &[
                    "-r",
                    FPS_TOKEN,
                    "-stream_loop",
                    "-1",
                    "-f",
                    "image2",
                    "-avoid_negative_ts",
                    "make_zero",
                    "-fflags",
                    "nobuffer",
                    "-flags",
                    "low_delay",
                    "-strict",
                    "experimental",
                    "-fflags",
                    "+genpts+discardcorrupt",
                    "-use_wallclock_as_timestamps",
                    "1",
                ],
            ),
        ),
        (
            "preset-http-mjpeg-generic",
            frag_with(
                &agent,
                &[
                    "-avoid_negative_ts",
                    "make_zero",
                    "-fflags",
                    "nobuffer",
                    "-flags",
                    "low_delay",
                    "-strict",
                    "experimental",
                    "-fflags",
                    "+genpts+discardcorrupt",
                    "-use_wallclock_as_timestamps",
                    "1",
                ],
            ),
        ),
        (
            "preset-http-reolink",
            frag_with(
                &agent,
                &[
                    "-avoid_negative_ts",
                    "make_zero",
                    "-fflags",
                    "+genpts+discardcorrupt",
                    "-flags",
                    "low_delay",
                    "-strict",
                    "experimental",
                    "-analyzeduration",
                    "1000M",
                    "-probesize",
                    "1000M",
                    "-rw_timeout",
                    "5000000",
                ],
            ),
        ),
        (
            "preset-rtmp-generic",
            frag(&[
                "-avoid_negative_ts",
                "make_zero",
                "-fflags",
                "nobuffer",
                "-flags",
                "low_delay",
                "-strict",
                "experimental",
                "-fflags",
                "+genpts+discardcorrupt",
                "-rw_timeout",
                "5000000",
                "-use_wallclock_as_timestamps",
                "1",
                "-f",
                "live_flv",
            ]),
        ),
        (
            "preset-rtsp-generic",
            frag_with(
                &agent,
                &[
                    "-avoid_negative_ts",
                    "make_zero",
                    "-fflags",
                    "+genpts+discardcorrupt",
                    "-rtsp_transport",
                    "tcp",
                    timeout,
                    "5000000",
                    "-use_wallclock_as_timestamps",
                    "1",
                ],
            ),
        ),
        (
            "preset-rtsp-restream",
            frag_with(&agent, &["-rtsp_transport", "tcp", timeout, "5000000"]),
        ),
        (
            "preset-rtsp-udp",
            frag_with(
                &agent,
                &[
                    "-avoid_negative_ts",
                    "make_zero",
                    "-fflags",
                    "+genpts+discardcorrupt",
                    "-rtsp_transport",
                    "udp",
                    timeout,
                    "5000000",
                    "-use_wallclock_as_timestamps",
                    "1",
                ],
            ),
        ),
        (
            "preset-rtsp-blue-iris",
            frag_with(
                &[agent.clone(), agent.clone()].concat(),
                &[
                    "-avoid_negative_ts",
                    "make_zero",
                    "-flags",
                    "low_delay",
                    "-strict",
                    "experimental",
                    "-fflags",
                    "+genpts+discardcorrupt",
                    "-rtsp_transport",
                    "tcp",
                    timeout,
                    "5000000",
                    "-use_wallclock_as_timestamps",
                    "1",
                ],
            ),
        ),
    ]
}

pub fn record_output_rows() -> Vec<(&'static str, Entry)> {
    const SEGMENT: &[&str] = &[
        "-f",
        "segment",
        "-segment_time",
        "10",
        "-segment_format",
        "mp4",
        "-reset_timestamps",
        "1",
        "-strftime",
        "1",
    ];
    let segment = |tail: &[&str]| frag(&[SEGMENT, tail].concat());

    vec![
        ("preset-record-generic", segment(&["-c", "copy", "-an"])),
        (
            "preset-record-generic-audio-aac",
            segment(&["-c:v", "copy", "-c:a", "aac"]),
        ),
        ("preset-record-generic-audio-copy", segment(&["-c", "copy"])),
        ("preset-record-mjpeg", segment(&["-c:v", "libx264", "-an"])),
        ("preset-record-jpeg", segment(&["-c:v", "libx264", "-an"])),
        (
            "preset-record-ubiquiti",
            segment(&["-c:v", "copy", "-ar", "44100", "-c:a", "aac"]),
        ),
    ]
}

pub fn rtmp_output_rows() -> Vec<(&'static str, Entry)> {
    vec![
        ("preset-rtmp-generic", frag(&["-c", "copy", "-f", "flv"])),
        ("preset-rtmp-mjpeg", frag(&["-c:v", "libx264", "-an", "-f", "flv"])),
        ("preset-rtmp-jpeg", frag(&["-c:v", "libx264", "-an", "-f", "flv"])),
        (
            "preset-rtmp-ubiquiti",
            frag(&["-c:v", "copy", "-f", "flv", "-ar", "44100", "-c:a", "aac"]),
        ),
    ]
}
