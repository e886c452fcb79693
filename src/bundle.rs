//! OSC bundle construction, serialization, parsing, and element iteration.
//!
//! Grounded on `OscBundle.c`/`.h` for layout and the reserve/serialize/
//! backfill construction pattern; the stateful cursor-holding container with
//! an iterator-shaped accessor follows
//! `examples/asayers-pcarp/src/internal/section.rs`'s `Section`.

use self::sealed::Contents;
use crate::common::{
    contents_is_bundle, contents_is_message, padded_len, TimeTag, BUNDLE_HEADER,
    MAX_BUNDLE_ELEMENTS_SIZE, MAX_BUNDLE_SIZE, MIN_BUNDLE_SIZE,
};
use crate::error::OscError;
use crate::message::Message;
use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

/// An OSC bundle: a time tag plus a concatenation of size-prefixed elements,
/// each itself a message or a nested bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    time_tag: TimeTag,
    elements: [u8; MAX_BUNDLE_ELEMENTS_SIZE],
    elements_len: usize,
    /// Read cursor for [`Bundle::next_element`].
    read_cursor: usize,
}

impl Bundle {
    pub fn new(time_tag: TimeTag) -> Bundle {
        Bundle {
            time_tag,
            elements: [0; MAX_BUNDLE_ELEMENTS_SIZE],
            elements_len: 0,
            read_cursor: 0,
        }
    }

    pub fn time_tag(&self) -> TimeTag {
        self.time_tag
    }

    pub fn is_empty(&self) -> bool {
        self.elements_len == 0
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_BUNDLE_ELEMENTS_SIZE
            .saturating_sub(self.elements_len)
            .saturating_sub(4)
    }

    /// Total serialized size, in bytes, of this bundle (header + time tag +
    /// elements).
    pub fn size(&self) -> usize {
        8 + 8 + self.elements_len
    }

    /// Appends a message or nested bundle as a new size-prefixed element.
    pub fn add_contents(&mut self, contents: &impl Contents) -> Result<(), OscError> {
        let size = contents.contents_size();
        if self.elements_len + 4 + size > MAX_BUNDLE_ELEMENTS_SIZE {
            warn!(error = %OscError::BundleFull, elements_len = self.elements_len, "bundle has no room for another element");
            return Err(OscError::BundleFull);
        }
        let prefix_start = self.elements_len;
        let data_start = prefix_start + 4;
        let written = contents.contents_serialize(&mut self.elements[data_start..data_start + size])?;
        BigEndian::write_i32(
            &mut self.elements[prefix_start..data_start],
            written as i32,
        );
        self.elements_len = data_start + written;
        Ok(())
    }

    pub fn serialize(&self, destination: &mut [u8]) -> Result<usize, OscError> {
        let size = self.size();
        if destination.len() < size {
            warn!(error = %OscError::DestinationTooSmall, needed = size, have = destination.len(), "bundle serialize destination too small");
            return Err(OscError::DestinationTooSmall);
        }
        destination[..8].copy_from_slice(BUNDLE_HEADER);
        self.time_tag.write_be(&mut destination[8..16]);
        destination[16..16 + self.elements_len].copy_from_slice(&self.elements[..self.elements_len]);
        Ok(size)
    }

    pub fn from_bytes(source: &[u8]) -> Result<Bundle, OscError> {
        let len = source.len();
        if len % 4 != 0 {
            warn!(error = %OscError::SizeIsNotMultipleOfFour, len, "bundle source length not a multiple of four");
            return Err(OscError::SizeIsNotMultipleOfFour);
        }
        if len < MIN_BUNDLE_SIZE {
            warn!(error = %OscError::BundleSizeTooSmall, len, "bundle source shorter than MIN_BUNDLE_SIZE");
            return Err(OscError::BundleSizeTooSmall);
        }
        if len > MAX_BUNDLE_SIZE {
            warn!(error = %OscError::BundleSizeTooLarge, len, "bundle source longer than MAX_BUNDLE_SIZE");
            return Err(OscError::BundleSizeTooLarge);
        }
        if source[0] != b'#' {
            warn!(error = %OscError::NoHashAtStartOfBundle, "bundle source missing leading '#'");
            return Err(OscError::NoHashAtStartOfBundle);
        }

        let time_tag = TimeTag::read_be(&source[8..16]);
        let mut bundle = Bundle::new(time_tag);
        let elements_len = len - 16;
        bundle.elements[..elements_len].copy_from_slice(&source[16..len]);
        bundle.elements_len = elements_len;
        debug!(elements_len, "parsed a bundle");
        Ok(bundle)
    }

    /// Reads the next size-prefixed element. Leaves the read cursor
    /// untouched if the element is malformed or out of bounds (deliberate
    /// divergence from the source's `OscBundleGetBundleElement`, which
    /// advances its cursor past the size prefix before validating it -- see
    /// DESIGN.md).
    pub fn next_element(&mut self) -> Result<Option<&[u8]>, OscError> {
        if self.read_cursor >= self.elements_len {
            return Ok(None);
        }
        if self.read_cursor + 4 > self.elements_len {
            warn!(error = %OscError::BundleElementNotAvailable, "not enough bytes left for another element's size prefix");
            return Err(OscError::BundleElementNotAvailable);
        }
        let size = BigEndian::read_i32(&self.elements[self.read_cursor..self.read_cursor + 4]);
        if size < 0 {
            warn!(error = %OscError::NegativeBundleElementSize, size, "bundle element declared a negative size");
            return Err(OscError::NegativeBundleElementSize);
        }
        if size % 4 != 0 {
            warn!(error = %OscError::SizeIsNotMultipleOfFour, size, "bundle element size not a multiple of four");
            return Err(OscError::SizeIsNotMultipleOfFour);
        }
        let size = size as usize;
        let data_start = self.read_cursor + 4;
        if data_start + size > self.elements_len {
            warn!(error = %OscError::InvalidElementSize, size, "bundle element size runs past the bundle end");
            return Err(OscError::InvalidElementSize);
        }
        self.read_cursor = data_start + size;
        Ok(Some(&self.elements[data_start..data_start + size]))
    }

    pub fn reset_read_cursor(&mut self) {
        self.read_cursor = 0;
    }
}

pub(crate) fn element_is_message(element: &[u8]) -> bool {
    contents_is_message(element)
}

pub(crate) fn element_is_bundle(element: &[u8]) -> bool {
    contents_is_bundle(element)
}

pub(crate) mod sealed {
    use super::*;

    /// Anything that can be the payload of a bundle element: a [`Message`]
    /// or a nested [`Bundle`]. Not implementable outside this crate.
    pub trait Contents {
        fn contents_size(&self) -> usize;
        fn contents_serialize(&self, destination: &mut [u8]) -> Result<usize, OscError>;
    }

    impl Contents for Message {
        fn contents_size(&self) -> usize {
            self.size()
        }
        fn contents_serialize(&self, destination: &mut [u8]) -> Result<usize, OscError> {
            self.serialize(destination)
        }
    }

    impl Contents for Bundle {
        fn contents_size(&self) -> usize {
            self.size()
        }
        fn contents_serialize(&self, destination: &mut [u8]) -> Result<usize, OscError> {
            self.serialize(destination)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_with_one_message() {
        let mut msg = Message::new("/foo").unwrap();
        msg.add_int32(1).unwrap();

        let mut bundle = Bundle::new(TimeTag::from_parts(1, 0));
        bundle.add_contents(&msg).unwrap();
        assert!(!bundle.is_empty());

        let mut buf = [0u8; 64];
        let n = bundle.serialize(&mut buf).unwrap();

        let mut parsed = Bundle::from_bytes(&buf[..n]).unwrap();
        assert_eq!(parsed.time_tag(), TimeTag::from_parts(1, 0));
        let element = parsed.next_element().unwrap().unwrap();
        assert!(element_is_message(element));
        assert!(parsed.next_element().unwrap().is_none());
    }

    #[test]
    fn nested_bundle_roundtrip() {
        let mut inner = Bundle::new(TimeTag::ZERO);
        let mut msg = Message::new("/nested").unwrap();
        msg.add_true().unwrap();
        inner.add_contents(&msg).unwrap();

        let mut outer = Bundle::new(TimeTag::ZERO);
        outer.add_contents(&inner).unwrap();

        let mut buf = [0u8; 64];
        let n = outer.serialize(&mut buf).unwrap();
        let mut parsed = Bundle::from_bytes(&buf[..n]).unwrap();
        let element = parsed.next_element().unwrap().unwrap();
        assert!(element_is_bundle(element));
    }

    #[test]
    fn malformed_element_leaves_cursor_untouched() {
        let mut bundle = Bundle::new(TimeTag::ZERO);
        // Declares a size of 4 but provides no data -- InvalidElementSize.
        BigEndian::write_i32(&mut bundle.elements[0..4], 4);
        bundle.elements_len = 4;

        assert!(matches!(
            bundle.next_element(),
            Err(OscError::InvalidElementSize)
        ));
        assert_eq!(bundle.read_cursor, 0);
    }

    #[test]
    fn bundle_full_rejected() {
        let mut bundle = Bundle::new(TimeTag::ZERO);
        let big_msg_pattern: String = "/".to_string() + &"a".repeat(60);
        let mut msg = Message::new(&big_msg_pattern).unwrap();
        for _ in 0..16 {
            msg.add_string("0123456789012345678901234567890123456789").unwrap();
        }
        loop {
            if bundle.add_contents(&msg).is_err() {
                break;
            }
        }
    }
}
