#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use neohub_rpc::NeoHubCodec;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Feed the stream in two chunks so partial frames are exercised
    let split = data.first().map_or(0, |b| usize::from(*b) % (data.len() + 1));
    let mut codec = NeoHubCodec::new();
    let mut buf = BytesMut::from(&data[..split]);

    while let Ok(Some(_)) = codec.decode(&mut buf) {}
    buf.extend_from_slice(&data[split..]);
    while let Ok(Some(_)) = codec.decode(&mut buf) {}
    let _ = codec.decode_eof(&mut buf);
});
