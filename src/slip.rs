//! SLIP (RFC 1055) byte-stuffing framing, used to carry OSC packets over an
//! otherwise unframed byte stream (e.g. a serial line).
//!
//! Grounded on `OscSlip.c`/`.h` for the exact byte-stuffing and
//! decode-on-`END` algorithm: raw (still-escaped) bytes are buffered as they
//! arrive, bounds-checked on their own, and the whole buffer is unescaped in
//! one pass only once `END` closes the frame. The decoder's buffer-index
//! bookkeeping (fill until a delimiter is seen, reset the index on overflow
//! or completion) follows the accumulate-then-parse shape of
//! `examples/asayers-pcarp/src/block/rdr.rs`'s `BlockReader`, adapted from
//! "peek for a complete frame" to "accumulate until `END`, then hand back
//! the whole decoded frame".

use crate::common::MAX_TRANSPORT_SIZE;
use crate::error::OscError;
use tracing::{debug, warn};

const END: u8 = 0xC0;
const ESC: u8 = 0xDB;
const ESC_END: u8 = 0xDC;
const ESC_ESC: u8 = 0xDD;

/// Encodes `source` as a SLIP frame (including the trailing `END` byte) into
/// `destination`, returning the number of bytes written.
pub fn slip_encode(source: &[u8], destination: &mut [u8]) -> Result<usize, OscError> {
    let mut out = 0;
    for &byte in source {
        match byte {
            END => {
                if out + 2 > destination.len() {
                    warn!(error = %OscError::DestinationTooSmall, "SLIP encode overflowed destination on END byte");
                    return Err(OscError::DestinationTooSmall);
                }
                destination[out] = ESC;
                destination[out + 1] = ESC_END;
                out += 2;
            }
            ESC => {
                if out + 2 > destination.len() {
                    warn!(error = %OscError::DestinationTooSmall, "SLIP encode overflowed destination on ESC byte");
                    return Err(OscError::DestinationTooSmall);
                }
                destination[out] = ESC;
                destination[out + 1] = ESC_ESC;
                out += 2;
            }
            b => {
                if out + 1 > destination.len() {
                    warn!(error = %OscError::DestinationTooSmall, "SLIP encode overflowed destination");
                    return Err(OscError::DestinationTooSmall);
                }
                destination[out] = b;
                out += 1;
            }
        }
    }
    if out + 1 > destination.len() {
        warn!(error = %OscError::DestinationTooSmall, "SLIP encode had no room for the trailing END byte");
        return Err(OscError::DestinationTooSmall);
    }
    destination[out] = END;
    out += 1;
    Ok(out)
}

/// One decoded frame, or progress-so-far.
#[derive(Debug, PartialEq, Eq)]
pub enum SlipEvent {
    /// A byte was consumed but no complete frame is available yet.
    Incomplete,
    /// A complete frame was decoded; its length is given (the frame itself
    /// is available via [`SlipDecoder::frame`]).
    FrameComplete(usize),
}

/// Accumulates SLIP-encoded bytes fed in one at a time via
/// [`SlipDecoder::process_byte`] and reassembles complete packets.
///
/// Decoding happens in two phases, per the source algorithm: raw bytes
/// (still escaped) accumulate in `raw` as they arrive, bounds-checked
/// against `MAX_TRANSPORT_SIZE` on their own; only when `END` closes the
/// frame does [`SlipDecoder::decode_buffered`] walk `raw` once and unescape
/// it into `decoded`, which is bounds-checked separately.
#[derive(Debug)]
pub struct SlipDecoder {
    raw: [u8; MAX_TRANSPORT_SIZE],
    raw_len: usize,
    decoded: [u8; MAX_TRANSPORT_SIZE],
    decoded_len: usize,
}

impl SlipDecoder {
    pub fn new() -> SlipDecoder {
        SlipDecoder {
            raw: [0; MAX_TRANSPORT_SIZE],
            raw_len: 0,
            decoded: [0; MAX_TRANSPORT_SIZE],
            decoded_len: 0,
        }
    }

    /// Discards any partially-decoded frame.
    pub fn clear(&mut self) {
        self.raw_len = 0;
        self.decoded_len = 0;
    }

    /// The decoded bytes of the most recently completed frame.
    pub fn frame(&self) -> &[u8] {
        &self.decoded[..self.decoded_len]
    }

    /// Feeds one received raw (still-escaped) byte into the decoder.
    pub fn process_byte(&mut self, byte: u8) -> Result<SlipEvent, OscError> {
        if byte == END {
            if self.raw_len == 0 {
                // Leading/duplicate END: treat as frame separator noise.
                return Ok(SlipEvent::Incomplete);
            }
            let len = self.decode_buffered()?;
            self.raw_len = 0;
            return Ok(SlipEvent::FrameComplete(len));
        }

        if self.raw_len >= MAX_TRANSPORT_SIZE {
            warn!(
                error = %OscError::EncodedSlipPacketTooLong,
                raw_len = self.raw_len,
                "encoded SLIP frame exceeded the decoder buffer before END"
            );
            self.clear();
            return Err(OscError::EncodedSlipPacketTooLong);
        }
        self.raw[self.raw_len] = byte;
        self.raw_len += 1;
        Ok(SlipEvent::Incomplete)
    }

    /// Unescapes `raw[..raw_len]` into `decoded` in a single pass, returning
    /// the decoded length.
    fn decode_buffered(&mut self) -> Result<usize, OscError> {
        let mut out = 0usize;
        let mut i = 0usize;
        while i < self.raw_len {
            let byte = self.raw[i];
            let decoded_byte = if byte == ESC {
                i += 1;
                if i >= self.raw_len {
                    warn!("SLIP frame ended with a dangling ESC byte");
                    self.clear();
                    return Err(OscError::UnexpectedByteAfterSlipEsc);
                }
                match self.raw[i] {
                    ESC_END => END,
                    ESC_ESC => ESC,
                    other => {
                        warn!(byte = other, "unexpected byte after SLIP ESC");
                        self.clear();
                        return Err(OscError::UnexpectedByteAfterSlipEsc);
                    }
                }
            } else {
                byte
            };
            i += 1;

            if out >= MAX_TRANSPORT_SIZE {
                warn!(
                    error = %OscError::DecodedSlipPacketTooLong,
                    "decoded SLIP frame exceeded MAX_TRANSPORT_SIZE"
                );
                self.clear();
                return Err(OscError::DecodedSlipPacketTooLong);
            }
            self.decoded[out] = decoded_byte;
            out += 1;
        }
        self.decoded_len = out;
        debug!(decoded_len = out, "decoded a complete SLIP frame");
        Ok(out)
    }
}

impl Default for SlipDecoder {
    fn default() -> Self {
        SlipDecoder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_escapes_end_and_esc_bytes() {
        let source = [0x01, END, ESC, 0x02];
        let mut dest = [0u8; 16];
        let n = slip_encode(&source, &mut dest).unwrap();
        assert_eq!(&dest[..n], &[0x01, ESC, ESC_END, ESC, ESC_ESC, 0x02, END]);
    }

    #[test]
    fn encode_destination_too_small() {
        let source = [0x01, 0x02, 0x03];
        let mut dest = [0u8; 2];
        assert!(matches!(
            slip_encode(&source, &mut dest),
            Err(OscError::DestinationTooSmall)
        ));
    }

    #[test]
    fn decode_roundtrip() {
        let source = [0x01, END, ESC, 0x02];
        let mut encoded = [0u8; 16];
        let n = slip_encode(&source, &mut encoded).unwrap();

        let mut decoder = SlipDecoder::new();
        let mut frame = None;
        for &byte in &encoded[..n] {
            if let SlipEvent::FrameComplete(len) = decoder.process_byte(byte).unwrap() {
                frame = Some(decoder.frame()[..len].to_vec());
            }
        }
        assert_eq!(frame.unwrap(), source);
    }

    // Scenario H.
    #[test]
    fn scenario_h_slip_escape() {
        let packet: [u8; 3] = [0xC0, 0xDB, 0x01];
        let mut encoded = [0u8; 16];
        let n = slip_encode(&packet, &mut encoded).unwrap();
        assert_eq!(&encoded[..n], &[0xDB, 0xDC, 0xDB, 0xDD, 0x01, 0xC0]);

        let mut decoder = SlipDecoder::new();
        let mut frame = None;
        for &byte in &encoded[..n] {
            if let SlipEvent::FrameComplete(len) = decoder.process_byte(byte).unwrap() {
                frame = Some(decoder.frame()[..len].to_vec());
            }
        }
        assert_eq!(frame.unwrap(), packet);
    }

    #[test]
    fn unexpected_byte_after_esc_is_rejected() {
        let mut decoder = SlipDecoder::new();
        decoder.process_byte(ESC).unwrap();
        decoder.process_byte(0x05).unwrap();
        assert!(matches!(
            decoder.process_byte(END),
            Err(OscError::UnexpectedByteAfterSlipEsc)
        ));
    }

    #[test]
    fn dangling_esc_at_end_of_frame_is_rejected() {
        let mut decoder = SlipDecoder::new();
        decoder.process_byte(ESC).unwrap();
        assert!(matches!(
            decoder.process_byte(END),
            Err(OscError::UnexpectedByteAfterSlipEsc)
        ));
    }

    #[test]
    fn encoded_frame_too_long_is_rejected() {
        let mut decoder = SlipDecoder::new();
        for _ in 0..MAX_TRANSPORT_SIZE {
            assert!(decoder.process_byte(0x41).is_ok());
        }
        assert!(matches!(
            decoder.process_byte(0x41),
            Err(OscError::EncodedSlipPacketTooLong)
        ));
    }

    #[test]
    fn decoder_clear_discards_partial_frame() {
        let mut decoder = SlipDecoder::new();
        decoder.process_byte(0x01).unwrap();
        decoder.process_byte(0x02).unwrap();
        decoder.clear();
        assert_eq!(decoder.frame().len(), 0);
    }
}
