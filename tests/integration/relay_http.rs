// Integration tests for the HTTP relay client
//
// A one-shot TCP listener stands in for go2rtc and captures the request
// line so the method and query can be checked.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use ffrelay::config::{AudioCodec, VideoCodec};
use ffrelay::error::RelayError;
use ffrelay::restream::{HttpRelayApi, RelayApi, Restreamer};

use crate::common::helpers::*;

/// Serve one request per status line, in order, returning the request lines seen.
fn serve(status_lines: Vec<&'static str>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/api/streams", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for status_line in status_lines {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            // drain headers
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }

            let mut stream = stream;
            write!(
                stream,
                "{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status_line
            )
            .unwrap();
            stream.flush().unwrap();

            seen.push(request_line.trim_end().to_string());
        }
        seen
    });

    (endpoint, handle)
}

fn serve_once(status_line: &'static str) -> (String, thread::JoinHandle<Vec<String>>) {
    serve(vec![status_line])
}

#[test]
fn test_put_stream_sends_src_and_name_as_query() {
    let (endpoint, server) = serve_once("HTTP/1.1 200 OK");
    let api = HttpRelayApi::new(&endpoint).unwrap();

    api.put_stream("front", "ffmpeg:rtsp://cam/main#video=copy")
        .unwrap();

    let request_lines = server.join().unwrap();
    assert_eq!(
        request_lines[0],
        "PUT /api/streams?src=ffmpeg%3Artsp%3A%2F%2Fcam%2Fmain%23video%3Dcopy&name=front HTTP/1.1"
    );
}

#[test]
fn test_non_success_status_is_not_an_error() {
    let (endpoint, server) = serve_once("HTTP/1.1 500 Internal Server Error");
    let api = HttpRelayApi::new(&endpoint).unwrap();

    api.put_stream("front", "rtsp://cam").unwrap();
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn test_rejected_stream_does_not_stop_later_cameras() {
    let (endpoint, server) = serve(vec!["HTTP/1.1 400 Bad Request", "HTTP/1.1 200 OK"]);
    let api = HttpRelayApi::new(&endpoint).unwrap();
    let config = config_with(vec![
        restream_camera("a", "rtsp://10.0.0.1/main", VideoCodec::Copy, &[AudioCodec::Copy]),
        restream_camera("b", "rtsp://10.0.0.2/main", VideoCodec::Copy, &[AudioCodec::Copy]),
    ]);

    let r = test_resolver();
    Restreamer::new(&config, &r).register_all(&api).unwrap();

    let request_lines = server.join().unwrap();
    assert_eq!(request_lines.len(), 2);
    assert!(request_lines[0].ends_with("&name=a HTTP/1.1"), "{}", request_lines[0]);
    assert!(request_lines[1].ends_with("&name=b HTTP/1.1"), "{}", request_lines[1]);
}

#[test]
fn test_unreachable_endpoint_is_a_request_error() {
    // bind then drop so nothing is listening on the port
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = HttpRelayApi::new(&format!("http://127.0.0.1:{}/api/streams", port)).unwrap();

    let err = api.put_stream("front", "rtsp://cam").unwrap_err();
    assert!(matches!(err, RelayError::Request { ref name, .. } if name == "front"));
}
