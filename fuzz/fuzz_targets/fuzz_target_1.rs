#![no_main]
use libfuzzer_sys::fuzz_target;
use osc_wire::slip::{SlipDecoder, SlipEvent};
use osc_wire::Packet;

fuzz_target!(|data: &[u8]| {
    let mut decoder = SlipDecoder::new();
    for &byte in data {
        match decoder.process_byte(byte) {
            Ok(SlipEvent::FrameComplete(len)) => {
                if let Ok(packet) = Packet::new(&decoder.frame()[..len]) {
                    let _ = packet.dispatch(&mut |_time_tag, _message| {});
                }
            }
            Ok(SlipEvent::Incomplete) => {}
            Err(_) => decoder.clear(),
        }
    }
});
