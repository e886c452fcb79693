//! Packet classification and recursive dispatch.
//!
//! Grounded on `OscPacket.c`/`.h` for the recursive deconstruction algorithm
//! and its depth-first inherited-time-tag passing; the top-level "pull one
//! parsed unit, hand it to caller" shape follows
//! `examples/asayers-pcarp/src/lib.rs`'s `Pcapng::next`, and the
//! match-and-delegate-by-discriminant dispatch style follows
//! `examples/asayers-pcarp/src/internal/section.rs`'s `Section::handle_block`.

use crate::bundle::Bundle;
use crate::common::{contents_is_bundle, contents_is_message, TimeTag, MAX_BUNDLE_NESTING, MAX_PACKET_SIZE};
use crate::error::OscError;
use crate::message::Message;
use tracing::{trace, warn};

/// A received or to-be-sent packet: raw contents bytes, at most
/// `MAX_PACKET_SIZE` of them.
#[derive(Debug, Clone, Copy)]
pub struct Packet<'a> {
    contents: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Wraps `contents` as a packet, without parsing it yet.
    pub fn new(contents: &'a [u8]) -> Result<Packet<'a>, OscError> {
        if contents.len() > MAX_PACKET_SIZE {
            warn!(error = %OscError::PacketSizeTooLarge, len = contents.len(), "packet contents longer than MAX_PACKET_SIZE");
            return Err(OscError::PacketSizeTooLarge);
        }
        if contents.is_empty() {
            warn!(error = %OscError::ContentsEmpty, "packet contents empty");
            return Err(OscError::ContentsEmpty);
        }
        Ok(Packet { contents })
    }

    pub fn contents(&self) -> &'a [u8] {
        self.contents
    }

    pub fn is_message(&self) -> bool {
        contents_is_message(self.contents)
    }

    pub fn is_bundle(&self) -> bool {
        contents_is_bundle(self.contents)
    }

    /// Recursively walks this packet's contents, invoking `callback` once
    /// per contained message with the time tag in effect for that message
    /// (`None` for a bare top-level message, `Some` inherited from the
    /// nearest enclosing bundle otherwise).
    pub fn dispatch(
        &self,
        callback: &mut dyn FnMut(Option<TimeTag>, &mut Message),
    ) -> Result<(), OscError> {
        dispatch_contents(self.contents, None, 0, callback)
    }
}

fn dispatch_contents(
    contents: &[u8],
    inherited_time_tag: Option<TimeTag>,
    depth: u32,
    callback: &mut dyn FnMut(Option<TimeTag>, &mut Message),
) -> Result<(), OscError> {
    if contents.is_empty() {
        warn!(error = %OscError::ContentsEmpty, depth, "dispatch reached empty contents");
        return Err(OscError::ContentsEmpty);
    }
    if contents_is_message(contents) {
        trace!(depth, "dispatching message contents");
        let mut message = Message::from_bytes(contents)?;
        callback(inherited_time_tag, &mut message);
        return Ok(());
    }
    if contents_is_bundle(contents) {
        if depth >= MAX_BUNDLE_NESTING {
            warn!(error = %OscError::InvalidContents, depth, "bundle nesting exceeded MAX_BUNDLE_NESTING");
            return Err(OscError::InvalidContents);
        }
        trace!(depth, "dispatching bundle contents");
        let mut bundle = Bundle::from_bytes(contents)?;
        let time_tag = bundle.time_tag();
        while let Some(element) = bundle.next_element()? {
            dispatch_contents(element, Some(time_tag), depth + 1, callback)?;
        }
        return Ok(());
    }
    warn!(error = %OscError::InvalidContents, depth, "contents neither a message nor a bundle");
    Err(OscError::InvalidContents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Bundle;

    #[test]
    fn dispatches_bare_message_with_no_inherited_time_tag() {
        let mut msg = Message::new("/foo").unwrap();
        msg.add_int32(9).unwrap();
        let mut buf = [0u8; 32];
        let n = msg.serialize(&mut buf).unwrap();

        let packet = Packet::new(&buf[..n]).unwrap();
        assert!(packet.is_message());

        let mut seen = Vec::new();
        packet
            .dispatch(&mut |tag, m| seen.push((tag, m.address_pattern().to_string())))
            .unwrap();
        assert_eq!(seen, vec![(None, "/foo".to_string())]);
    }

    #[test]
    fn dispatches_bundle_elements_with_inherited_time_tag() {
        let mut msg = Message::new("/a").unwrap();
        msg.add_true().unwrap();
        let tag = TimeTag::from_parts(100, 0);
        let mut bundle = Bundle::new(tag);
        bundle.add_contents(&msg).unwrap();

        let mut buf = [0u8; 64];
        let n = bundle.serialize(&mut buf).unwrap();
        let packet = Packet::new(&buf[..n]).unwrap();
        assert!(packet.is_bundle());

        let mut seen = Vec::new();
        packet
            .dispatch(&mut |t, m| seen.push((t, m.address_pattern().to_string())))
            .unwrap();
        assert_eq!(seen, vec![(Some(tag), "/a".to_string())]);
    }

    // Scenario D.
    #[test]
    fn scenario_d_bundle_with_two_messages() {
        let tag = TimeTag::read_be(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        let mut bundle = Bundle::new(tag);

        let msg_a = Message::new("/a").unwrap();
        bundle.add_contents(&msg_a).unwrap();

        let mut msg_b = Message::new("/b").unwrap();
        msg_b.add_int32(1).unwrap();
        bundle.add_contents(&msg_b).unwrap();

        let mut buf = [0u8; 64];
        let n = bundle.serialize(&mut buf).unwrap();
        let packet = Packet::new(&buf[..n]).unwrap();

        let mut seen = Vec::new();
        packet
            .dispatch(&mut |t, m| seen.push((t, m.address_pattern().to_string())))
            .unwrap();
        assert_eq!(
            seen,
            vec![(Some(tag), "/a".to_string()), (Some(tag), "/b".to_string())]
        );
    }

    #[test]
    fn empty_contents_rejected() {
        assert!(matches!(Packet::new(&[]), Err(OscError::ContentsEmpty)));
    }

    #[test]
    fn invalid_first_byte_rejected() {
        let packet = Packet::new(b"xyz!").unwrap();
        let mut calls = 0;
        let result = packet.dispatch(&mut |_, _| calls += 1);
        assert!(matches!(result, Err(OscError::InvalidContents)));
        assert_eq!(calls, 0);
    }
}
