//! Tests for the pull-based upload streamer

mod common;

use std::io::Cursor;

use common::{RecordingSink, SinkEvent};
use courier_client::engine::UploadDataProvider;
use courier_client::{Body, UploadStreamer};

#[test]
fn empty_body_finishes_in_one_call() {
    let streamer = UploadStreamer::new(Body::empty());
    let sink = RecordingSink::new();
    let mut buffer = vec![0u8; 64];

    streamer.read(&sink, &mut buffer);
    streamer.read(&sink, &mut buffer);

    // First call reports zero-final; a duplicate pull re-reports it
    // without error.
    assert_eq!(
        sink.events(),
        vec![
            SinkEvent::ReadSucceeded {
                bytes: 0,
                final_chunk: true
            },
            SinkEvent::ReadSucceeded {
                bytes: 0,
                final_chunk: true
            },
        ]
    );
}

#[test]
fn chunks_concatenate_in_order() {
    let payload = b"0123456789";
    let streamer = UploadStreamer::new(Body::from_bytes(payload.to_vec()));
    assert_eq!(streamer.length(), 10);

    let sink = RecordingSink::new();
    let mut collected = Vec::new();
    let mut supplies = 0;

    loop {
        let mut buffer = vec![0u8; 4];
        streamer.read(&sink, &mut buffer);
        match sink.take_last() {
            Some(SinkEvent::ReadSucceeded { bytes, final_chunk }) => {
                collected.extend_from_slice(&buffer[..bytes]);
                if final_chunk {
                    break;
                }
                // Finality is lazy: nonzero chunks never carry the flag.
                assert!(bytes > 0);
                supplies += 1;
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    assert_eq!(collected, payload);
    // ceil(10 / 4) non-terminal supply calls.
    assert_eq!(supplies, 3);
    assert_eq!(streamer.bytes_sent(), 10);
    assert!(streamer.is_completed());
}

#[test]
fn unknown_length_stream_reads_until_dry() {
    let streamer = UploadStreamer::new(Body::from_stream(Cursor::new(b"abcde".to_vec())));
    assert_eq!(streamer.length(), -1);

    let sink = RecordingSink::new();
    let mut collected = Vec::new();
    loop {
        let mut buffer = vec![0u8; 2];
        streamer.read(&sink, &mut buffer);
        match sink.take_last() {
            Some(SinkEvent::ReadSucceeded { bytes, final_chunk }) => {
                collected.extend_from_slice(&buffer[..bytes]);
                if final_chunk {
                    break;
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(collected, b"abcde");
}

#[test]
fn stream_shorter_than_declared_length_errors() {
    let streamer =
        UploadStreamer::new(Body::from_stream_with_length(Cursor::new(b"abc".to_vec()), 10));
    let sink = RecordingSink::new();

    let mut buffer = vec![0u8; 64];
    streamer.read(&sink, &mut buffer);
    assert_eq!(
        sink.take_last(),
        Some(SinkEvent::ReadSucceeded {
            bytes: 3,
            final_chunk: false
        })
    );

    // The declared length promises seven more bytes that do not exist.
    streamer.read(&sink, &mut buffer);
    match sink.take_last() {
        Some(SinkEvent::ReadError(message)) => {
            assert!(message.contains("declared length"), "unexpected {message:?}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rewind_without_factory_is_rejected() {
    let streamer = UploadStreamer::new(Body::from_bytes(b"abc".to_vec()));
    let sink = RecordingSink::new();

    streamer.rewind(&sink);
    assert_eq!(
        sink.take_last(),
        Some(SinkEvent::RewindError("rewinding is not supported".to_string()))
    );
}

#[test]
fn rewind_resets_the_cursor() {
    let streamer = UploadStreamer::with_rewind(Body::from_bytes(b"abcdef".to_vec()), || {
        Body::from_bytes(b"abcdef".to_vec())
    });
    let sink = RecordingSink::new();

    let mut buffer = vec![0u8; 4];
    streamer.read(&sink, &mut buffer);
    assert_eq!(streamer.bytes_sent(), 4);

    streamer.rewind(&sink);
    assert_eq!(sink.take_last(), Some(SinkEvent::RewindSucceeded));
    assert_eq!(streamer.bytes_sent(), 0);
    assert!(!streamer.is_completed());

    let mut buffer = vec![0u8; 4];
    streamer.read(&sink, &mut buffer);
    assert_eq!(
        sink.take_last(),
        Some(SinkEvent::ReadSucceeded {
            bytes: 4,
            final_chunk: false
        })
    );
    assert_eq!(&buffer[..4], b"abcd");
}
