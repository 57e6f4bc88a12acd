//! Codec and counter properties that hold for any input.

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use ibgate_api::decoder::decode_server_msg;
use ibgate_api::{encode_frame, ConnectionStats, FrameScanner, MessageDecoder, MessageEncoder};

/// Split `data` at the given cut points (taken modulo its length).
fn chunks(data: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (data.len() + 1)).collect();
    points.push(0);
    points.push(data.len());
    points.sort_unstable();
    points.dedup();
    points.windows(2).map(|w| data[w[0]..w[1]].to_vec()).collect()
}

proptest! {
    #[test]
    fn frame_round_trip(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let frame = encode_frame(&payload).unwrap();
        let mut scanner = FrameScanner::new();
        scanner.push(&frame);
        let out = scanner.next_frame().unwrap().unwrap();
        prop_assert_eq!(&out[..], &payload[..]);
        prop_assert_eq!(scanner.buffered(), 0);
    }

    #[test]
    fn chunked_delivery_yields_the_same_frames(
        payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..256), 1..8),
        cuts in proptest::collection::vec(any::<usize>(), 0..32),
    ) {
        let mut stream = Vec::new();
        for p in &payloads {
            stream.extend_from_slice(&encode_frame(p).unwrap());
        }

        let mut scanner = FrameScanner::new();
        let mut seen = Vec::new();
        for chunk in chunks(&stream, &cuts) {
            scanner.push(&chunk);
            while let Some(frame) = scanner.next_frame().unwrap() {
                seen.push(frame.to_vec());
            }
        }
        prop_assert_eq!(seen, payloads);
        prop_assert_eq!(scanner.buffered(), 0);
    }

    #[test]
    fn unset_and_zero_never_collide(value in proptest::option::of(any::<i32>())) {
        let mut enc = MessageEncoder::new(176, 0);
        enc.push_int_max(value);
        let frame = enc.finish().unwrap();
        let mut dec = MessageDecoder::new(&frame[4..], 176);
        dec.decode_int().unwrap();
        prop_assert_eq!(dec.decode_int_show_unset().unwrap(), value.filter(|v| *v != i32::MAX));
    }

    #[test]
    fn decoding_is_deterministic(order_id in 0i32..1_000_000, sv in 100i32..=200) {
        let data = format!("9\x001\x00{order_id}\x00").into_bytes();
        let first = format!("{:?}", decode_server_msg(&data, sv).unwrap());
        let second = format!("{:?}", decode_server_msg(&data, sv).unwrap());
        prop_assert_eq!(first, second);
    }
}

#[test]
fn zero_and_unset_int_are_distinct() {
    let mut enc = MessageEncoder::new(176, 0);
    enc.push_int_max(Some(0)).push_int_max(None);
    let frame = enc.finish().unwrap();
    assert_eq!(&frame[4..], b"0\x000\x00\x00");

    let mut dec = MessageDecoder::new(&frame[4..], 176);
    dec.skip_field().unwrap();
    assert_eq!(dec.decode_int_show_unset().unwrap(), Some(0));
    assert_eq!(dec.decode_int_show_unset().unwrap(), None);
}

#[test]
fn long_max_decimal_text_is_unset() {
    let mut dec = MessageDecoder::new(b"9223372036854775807\x00100\x00", 176);
    assert_eq!(dec.decode_decimal().unwrap(), None);
    assert_eq!(dec.decode_decimal().unwrap(), Some(rust_decimal::Decimal::new(100, 0)));
}

#[test]
fn counters_never_tear_under_concurrent_reset() {
    let stats = Arc::new(ConnectionStats::new());
    let mut handles = Vec::new();

    for _ in 0..4 {
        let stats = Arc::clone(&stats);
        handles.push(thread::spawn(move || {
            for _ in 0..5_000 {
                stats.record_sent(10);
                stats.record_received(3);
            }
        }));
    }
    {
        let stats = Arc::clone(&stats);
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                stats.reset();
                thread::yield_now();
            }
        }));
    }
    {
        let stats = Arc::clone(&stats);
        handles.push(thread::spawn(move || {
            for _ in 0..5_000 {
                let s = stats.snapshot();
                assert_eq!(s.bytes_sent, s.messages_sent * 10);
                assert_eq!(s.bytes_received, s.messages_received * 3);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let s = stats.snapshot();
    assert_eq!(s.bytes_sent, s.messages_sent * 10);
}
