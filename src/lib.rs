//! A pure-Rust, allocation-free codec and dispatch engine for the Open Sound
//! Control (OSC) 1.0 wire format, plus a SLIP framing layer for carrying OSC
//! packets over unframed byte streams (e.g. a serial line).
//!
//! Every buffer in this crate is fixed-capacity and inline; there is no
//! dynamic allocation anywhere on the hot path, so the crate is usable on a
//! microcontroller as well as a hosted target.
//!
//! The modules mirror the pipeline a packet travels through:
//!
//! - [`common`]: shared fixed-size types (time tags, RGBA colours, MIDI
//!   messages) and the wire-format size limits.
//! - [`address`]: the `?`/`*`/`[...]`/`{...}` address-pattern matcher.
//! - [`message`]: building, serializing, and parsing OSC messages.
//! - [`bundle`]: building, serializing, and parsing OSC bundles.
//! - [`packet`]: classification and recursive dispatch of top-level packets.
//! - [`slip`]: SLIP byte-stuffing for transports without their own framing.

pub mod address;
pub mod bundle;
pub mod common;
pub mod error;
pub mod message;
pub mod packet;
pub mod slip;

pub use bundle::Bundle;
pub use common::{MidiMessage, RgbaColour, TimeTag};
pub use error::OscError;
pub use message::{Message, TypeTag};
pub use packet::Packet;
pub use slip::{slip_encode, SlipDecoder, SlipEvent};

#[cfg(test)]
mod tests {
    use super::*;

    /// End-to-end: build a bundle containing a message, serialize it,
    /// SLIP-encode it, decode it back byte-by-byte, and dispatch it.
    #[test]
    fn send_and_receive_roundtrip() {
        let mut msg = Message::new("/synth/freq").unwrap();
        msg.add_float32(440.0).unwrap();
        msg.add_string("sine").unwrap();

        let mut bundle = Bundle::new(TimeTag::from_parts(3_915_734_400, 0));
        bundle.add_contents(&msg).unwrap();

        let mut packet_buf = [0u8; 128];
        let packet_len = bundle.serialize(&mut packet_buf).unwrap();

        let mut slip_buf = [0u8; 256];
        let slip_len = slip_encode(&packet_buf[..packet_len], &mut slip_buf).unwrap();

        let mut decoder = SlipDecoder::new();
        let mut decoded_len = None;
        for &byte in &slip_buf[..slip_len] {
            if let SlipEvent::FrameComplete(len) = decoder.process_byte(byte).unwrap() {
                decoded_len = Some(len);
            }
        }
        let decoded_len = decoded_len.expect("a complete frame");
        let frame = decoder.frame()[..decoded_len].to_vec();

        let packet = Packet::new(&frame).unwrap();
        let mut received = Vec::new();
        packet
            .dispatch(&mut |tag, m| {
                received.push((
                    tag,
                    m.address_pattern().to_string(),
                    m.get_argument_as_float32().unwrap(),
                ))
            })
            .unwrap();

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, Some(TimeTag::from_parts(3_915_734_400, 0)));
        assert_eq!(received[0].1, "/synth/freq");
        assert_eq!(received[0].2, 440.0f32);
    }
}
