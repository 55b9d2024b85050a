#![no_main]

use libfuzzer_sys::fuzz_target;
use neohub_core::{HubAddress, LiveData, NeoHub, RequestOptions, ZoneControl};

fuzz_target!(|data: &[u8]| {
    // Arbitrary replies must decode or fail, never panic
    let Ok(reply) = serde_json::from_slice::<neohub_core::Reply>(data) else {
        return;
    };
    let control = ZoneControl::new(NeoHub::new(
        HubAddress::new("127.0.0.1", 4242),
        RequestOptions::default(),
    ));
    let _ = LiveData::from_reply(reply, &control);
});
