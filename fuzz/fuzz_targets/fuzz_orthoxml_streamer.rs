#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use orthoxml_stream::streamer::OrthoXmlStreamer;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must end in an item stream or an error, never a panic
    let mut streamer = OrthoXmlStreamer::new(Cursor::new(data));
    for _ in 0..10_000 {
        match streamer.next_item() {
            Ok(Some(_item)) => {}
            Ok(None) | Err(_) => break,
        }
    }
});
