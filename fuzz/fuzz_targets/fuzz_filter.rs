#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use orthoxml_stream::filter::{filter_stream, FilterConfig, FilterStrategy};
use orthoxml_stream::transducer::TransducerConfig;

fuzz_target!(|data: &[u8]| {
    // Both strategies run the full read-visit-write loop
    for strategy in [FilterStrategy::CascadeRemove, FilterStrategy::Extract] {
        let config = FilterConfig::new(0.5, strategy);
        let _ = filter_stream(Cursor::new(data), Vec::new(), &config, &TransducerConfig::default());
    }
});
