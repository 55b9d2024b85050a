#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(reply) = serde_json::from_slice::<neohub_core::Reply>(data) {
        let _ = neohub_core::SystemInfo::from_reply(&reply);
        let _ = neohub_core::HolidayWindow::from_reply(&reply);
    }
});
