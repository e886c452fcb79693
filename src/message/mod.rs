//! OSC message construction, serialization, parsing, and typed/coercing
//! argument access.
//!
//! Grounded on `OscMessage.c`/`.h` for wire layout, bound constants, and
//! cursor semantics; the cursor-driven read loop follows the shape of
//! `examples/asayers-pcarp/src/block/opts.rs`'s `parse_options`.

mod args;

pub use args::TypeTag;

use crate::common::{
    padded_len, MidiMessage, RgbaColour, TimeTag, L_ADDR, MAX_ARGUMENTS_SIZE, MAX_MESSAGE_SIZE,
    MAX_TYPE_TAG_STRING_LENGTH, MIN_MESSAGE_SIZE, N_ARG,
};
use crate::error::OscError;
use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};

/// An OSC message: an address pattern, a type-tag string, and an argument
/// blob, all stored inline with no heap allocation.
#[derive(Debug, Clone)]
pub struct Message {
    address_pattern: [u8; L_ADDR + 1],
    address_pattern_len: usize,
    type_tags: [u8; MAX_TYPE_TAG_STRING_LENGTH],
    type_tags_len: usize,
    arguments: [u8; MAX_ARGUMENTS_SIZE],
    arguments_len: usize,
    /// Read cursor into `type_tags`, 0-based index past the leading comma.
    tag_cursor: usize,
    /// Read cursor into `arguments`.
    arg_cursor: usize,
}

impl Message {
    /// An empty message with the given address pattern. `pattern` may be
    /// empty (to be filled in later via [`Message::append_address`]), but if
    /// non-empty must start with `/`.
    pub fn new(pattern: &str) -> Result<Message, OscError> {
        let mut msg = Message {
            address_pattern: [0; L_ADDR + 1],
            address_pattern_len: 0,
            type_tags: [0; MAX_TYPE_TAG_STRING_LENGTH],
            type_tags_len: 1,
            arguments: [0; MAX_ARGUMENTS_SIZE],
            arguments_len: 0,
            tag_cursor: 0,
            arg_cursor: 0,
        };
        msg.type_tags[0] = b',';
        if !pattern.is_empty() {
            msg.append_address(pattern)?;
        }
        Ok(msg)
    }

    /// Appends a slash-initiated fragment to the address pattern.
    pub fn append_address(&mut self, fragment: &str) -> Result<(), OscError> {
        if !fragment.starts_with('/') {
            warn!(error = %OscError::NoSlashAtStartOfMessage, fragment, "address fragment missing leading slash");
            return Err(OscError::NoSlashAtStartOfMessage);
        }
        let bytes = fragment.as_bytes();
        if self.address_pattern_len + bytes.len() > L_ADDR {
            warn!(error = %OscError::AddressPatternTooLong, len = self.address_pattern_len + bytes.len(), "address pattern too long");
            return Err(OscError::AddressPatternTooLong);
        }
        self.address_pattern[self.address_pattern_len..self.address_pattern_len + bytes.len()]
            .copy_from_slice(bytes);
        self.address_pattern_len += bytes.len();
        Ok(())
    }

    pub fn address_pattern(&self) -> &str {
        std::str::from_utf8(&self.address_pattern[..self.address_pattern_len]).unwrap_or("")
    }

    pub fn type_tag_string(&self) -> &str {
        std::str::from_utf8(&self.type_tags[..self.type_tags_len]).unwrap_or(",")
    }

    fn number_of_arguments(&self) -> usize {
        self.type_tags_len - 1
    }

    fn check_room_for_tag(&self) -> Result<(), OscError> {
        if self.number_of_arguments() + 1 > N_ARG {
            warn!(error = %OscError::TooManyArguments, "argument count exceeds N_ARG");
            return Err(OscError::TooManyArguments);
        }
        Ok(())
    }

    fn reserve_argument_bytes(&mut self, len: usize) -> Result<usize, OscError> {
        if self.arguments_len + len > MAX_ARGUMENTS_SIZE {
            warn!(error = %OscError::ArgumentsSizeTooLarge, requested = self.arguments_len + len, "argument bytes exceed MAX_ARGUMENTS_SIZE");
            return Err(OscError::ArgumentsSizeTooLarge);
        }
        let start = self.arguments_len;
        self.arguments_len += len;
        Ok(start)
    }

    fn push_tag(&mut self, tag: TypeTag) {
        self.type_tags[self.type_tags_len] = tag.as_byte();
        self.type_tags_len += 1;
    }

    pub fn add_int32(&mut self, value: i32) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(4)?;
        BigEndian::write_i32(&mut self.arguments[start..start + 4], value);
        self.push_tag(TypeTag::Int32);
        Ok(())
    }

    pub fn add_float32(&mut self, value: f32) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(4)?;
        BigEndian::write_f32(&mut self.arguments[start..start + 4], value);
        self.push_tag(TypeTag::Float32);
        Ok(())
    }

    fn add_string_like(&mut self, value: &str, tag: TypeTag) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let bytes = value.as_bytes();
        let total = padded_len(bytes.len() + 1);
        let start = self.reserve_argument_bytes(total)?;
        self.arguments[start..start + bytes.len()].copy_from_slice(bytes);
        for b in &mut self.arguments[start + bytes.len()..start + total] {
            *b = 0;
        }
        self.push_tag(tag);
        Ok(())
    }

    pub fn add_string(&mut self, value: &str) -> Result<(), OscError> {
        self.add_string_like(value, TypeTag::String)
    }

    pub fn add_alternate_string(&mut self, value: &str) -> Result<(), OscError> {
        self.add_string_like(value, TypeTag::AlternateString)
    }

    pub fn add_blob(&mut self, value: &[u8]) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let total = 4 + padded_len(value.len());
        let start = self.reserve_argument_bytes(total)?;
        BigEndian::write_i32(&mut self.arguments[start..start + 4], value.len() as i32);
        self.arguments[start + 4..start + 4 + value.len()].copy_from_slice(value);
        for b in &mut self.arguments[start + 4 + value.len()..start + total] {
            *b = 0;
        }
        self.push_tag(TypeTag::Blob);
        Ok(())
    }

    pub fn add_int64(&mut self, value: i64) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(8)?;
        BigEndian::write_i64(&mut self.arguments[start..start + 8], value);
        self.push_tag(TypeTag::Int64);
        Ok(())
    }

    pub fn add_time_tag(&mut self, value: TimeTag) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(8)?;
        value.write_be(&mut self.arguments[start..start + 8]);
        self.push_tag(TypeTag::TimeTag);
        Ok(())
    }

    pub fn add_double(&mut self, value: f64) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(8)?;
        BigEndian::write_f64(&mut self.arguments[start..start + 8], value);
        self.push_tag(TypeTag::Double);
        Ok(())
    }

    pub fn add_character(&mut self, value: u8) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(4)?;
        self.arguments[start] = 0;
        self.arguments[start + 1] = 0;
        self.arguments[start + 2] = 0;
        self.arguments[start + 3] = value;
        self.push_tag(TypeTag::Character);
        Ok(())
    }

    pub fn add_rgba_colour(&mut self, value: RgbaColour) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(4)?;
        value.write_be(&mut self.arguments[start..start + 4]);
        self.push_tag(TypeTag::RgbaColour);
        Ok(())
    }

    pub fn add_midi_message(&mut self, value: MidiMessage) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        let start = self.reserve_argument_bytes(4)?;
        value.write_be(&mut self.arguments[start..start + 4]);
        self.push_tag(TypeTag::MidiMessage);
        Ok(())
    }

    fn add_zero_byte_tag(&mut self, tag: TypeTag) -> Result<(), OscError> {
        self.check_room_for_tag()?;
        self.push_tag(tag);
        Ok(())
    }

    pub fn add_true(&mut self) -> Result<(), OscError> {
        self.add_zero_byte_tag(TypeTag::True)
    }
    pub fn add_false(&mut self) -> Result<(), OscError> {
        self.add_zero_byte_tag(TypeTag::False)
    }
    pub fn add_nil(&mut self) -> Result<(), OscError> {
        self.add_zero_byte_tag(TypeTag::Nil)
    }
    pub fn add_infinitum(&mut self) -> Result<(), OscError> {
        self.add_zero_byte_tag(TypeTag::Infinitum)
    }
    pub fn add_begin_array(&mut self) -> Result<(), OscError> {
        self.add_zero_byte_tag(TypeTag::BeginArray)
    }
    pub fn add_end_array(&mut self) -> Result<(), OscError> {
        self.add_zero_byte_tag(TypeTag::EndArray)
    }

    /// Total serialized size, in bytes, of this message.
    pub fn size(&self) -> usize {
        padded_len(self.address_pattern_len + 1) + padded_len(self.type_tags_len + 1) + self.arguments_len
    }

    /// Writes the wire representation into `destination`, returning the
    /// number of bytes written.
    pub fn serialize(&self, destination: &mut [u8]) -> Result<usize, OscError> {
        if self.address_pattern_len == 0 {
            warn!(error = %OscError::UndefinedAddressPattern, "serialize called with no address pattern set");
            return Err(OscError::UndefinedAddressPattern);
        }
        if self.address_pattern[0] != b'/' {
            warn!(error = %OscError::NoSlashAtStartOfMessage, "serialize found an address pattern without a leading slash");
            return Err(OscError::NoSlashAtStartOfMessage);
        }
        let size = self.size();
        if destination.len() < size {
            warn!(error = %OscError::DestinationTooSmall, needed = size, have = destination.len(), "serialize destination too small");
            return Err(OscError::DestinationTooSmall);
        }

        let mut offset = 0;
        let addr_padded = padded_len(self.address_pattern_len + 1);
        destination[..self.address_pattern_len]
            .copy_from_slice(&self.address_pattern[..self.address_pattern_len]);
        for b in &mut destination[self.address_pattern_len..addr_padded] {
            *b = 0;
        }
        offset += addr_padded;

        let tags_padded = padded_len(self.type_tags_len + 1);
        destination[offset..offset + self.type_tags_len]
            .copy_from_slice(&self.type_tags[..self.type_tags_len]);
        for b in &mut destination[offset + self.type_tags_len..offset + tags_padded] {
            *b = 0;
        }
        offset += tags_padded;

        destination[offset..offset + self.arguments_len]
            .copy_from_slice(&self.arguments[..self.arguments_len]);
        offset += self.arguments_len;

        Ok(offset)
    }

    /// Parses a complete wire-format message out of `source`.
    pub fn from_bytes(source: &[u8]) -> Result<Message, OscError> {
        let len = source.len();
        if len % 4 != 0 {
            warn!(error = %OscError::SizeIsNotMultipleOfFour, len, "message source length not a multiple of four");
            return Err(OscError::SizeIsNotMultipleOfFour);
        }
        if len < MIN_MESSAGE_SIZE {
            warn!(error = %OscError::MessageSizeTooSmall, len, "message source shorter than MIN_MESSAGE_SIZE");
            return Err(OscError::MessageSizeTooSmall);
        }
        if len > MAX_MESSAGE_SIZE {
            warn!(error = %OscError::MessageSizeTooLarge, len, "message source longer than MAX_MESSAGE_SIZE");
            return Err(OscError::MessageSizeTooLarge);
        }
        if source[0] != b'/' {
            warn!(error = %OscError::NoSlashAtStartOfMessage, "message source missing leading slash");
            return Err(OscError::NoSlashAtStartOfMessage);
        }

        let mut msg = Message::new("")?;

        let mut i = 0usize;
        while i < len && source[i] != 0 {
            if msg.address_pattern_len >= L_ADDR {
                warn!(error = %OscError::AddressPatternTooLong, "parsed address pattern exceeded L_ADDR");
                return Err(OscError::AddressPatternTooLong);
            }
            msg.address_pattern[msg.address_pattern_len] = source[i];
            msg.address_pattern_len += 1;
            i += 1;
            if i >= len {
                warn!(error = %OscError::SourceEndsBeforeEndOfAddressPattern, "source ended before the address pattern was terminated");
                return Err(OscError::SourceEndsBeforeEndOfAddressPattern);
            }
        }
        i = padded_len(i + 1);
        if i > len {
            warn!(error = %OscError::SourceEndsBeforeStartOfTypeTagString, "source ended before the padded type-tag string could start");
            return Err(OscError::SourceEndsBeforeStartOfTypeTagString);
        }
        if i >= len || source[i] != b',' {
            warn!(error = %OscError::SourceEndsBeforeStartOfTypeTagString, "type-tag string missing leading comma");
            return Err(OscError::SourceEndsBeforeStartOfTypeTagString);
        }

        msg.type_tags_len = 0;
        while i < len && source[i] != 0 {
            if msg.type_tags_len >= MAX_TYPE_TAG_STRING_LENGTH {
                warn!(error = %OscError::TypeTagStringTooLong, "type-tag string exceeded MAX_TYPE_TAG_STRING_LENGTH");
                return Err(OscError::TypeTagStringTooLong);
            }
            msg.type_tags[msg.type_tags_len] = source[i];
            msg.type_tags_len += 1;
            i += 1;
            if i >= len {
                warn!(error = %OscError::SourceEndsBeforeEndOfTypeTagString, "source ended before the type-tag string was terminated");
                return Err(OscError::SourceEndsBeforeEndOfTypeTagString);
            }
        }
        i = padded_len(i + 1);
        if i > len {
            warn!(error = %OscError::SourceEndsBeforeEndOfTypeTagString, "source ended before the padded type-tag string did");
            return Err(OscError::SourceEndsBeforeEndOfTypeTagString);
        }

        let args_len = len - i;
        if args_len > MAX_ARGUMENTS_SIZE {
            warn!(error = %OscError::ArgumentsSizeTooLarge, args_len, "parsed argument bytes exceed MAX_ARGUMENTS_SIZE");
            return Err(OscError::ArgumentsSizeTooLarge);
        }
        msg.arguments[..args_len].copy_from_slice(&source[i..len]);
        msg.arguments_len = args_len;

        debug!(address = msg.address_pattern(), type_tags = msg.type_tag_string(), "parsed a message");
        Ok(msg)
    }

    fn current_tag(&self) -> Option<TypeTag> {
        if self.tag_cursor >= self.number_of_arguments() {
            return None;
        }
        TypeTag::from_byte(self.type_tags[1 + self.tag_cursor])
    }

    pub fn is_argument_available(&self) -> bool {
        self.tag_cursor < self.number_of_arguments()
    }

    pub fn get_argument_type(&self) -> Option<TypeTag> {
        self.current_tag()
    }

    pub fn skip_argument(&mut self) -> Result<(), OscError> {
        if self.current_tag().is_none() {
            debug!(error = %OscError::NoArgumentsAvailable, "skip_argument called with no arguments left");
            return Err(OscError::NoArgumentsAvailable);
        }
        self.tag_cursor += 1;
        Ok(())
    }

    fn expect_tag(&self, expected: TypeTag) -> Result<(), OscError> {
        match self.current_tag() {
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "getter called with no arguments left");
                Err(OscError::NoArgumentsAvailable)
            }
            Some(t) if t == expected => Ok(()),
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, expected = ?expected, found = ?t, "argument type mismatch");
                Err(OscError::UnexpectedArgumentType)
            }
        }
    }

    fn take_fixed(&mut self, len: usize) -> Result<&[u8], OscError> {
        if self.arg_cursor + len > self.arguments_len {
            warn!(error = %OscError::MessageTooShortForArgumentType, "message too short for fixed-width argument");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        let start = self.arg_cursor;
        self.arg_cursor += len;
        self.tag_cursor += 1;
        Ok(&self.arguments[start..start + len])
    }

    pub fn get_int32(&mut self) -> Result<i32, OscError> {
        self.expect_tag(TypeTag::Int32)?;
        Ok(BigEndian::read_i32(self.take_fixed(4)?))
    }

    pub fn get_float32(&mut self) -> Result<f32, OscError> {
        self.expect_tag(TypeTag::Float32)?;
        Ok(BigEndian::read_f32(self.take_fixed(4)?))
    }

    pub fn get_int64(&mut self) -> Result<i64, OscError> {
        self.expect_tag(TypeTag::Int64)?;
        Ok(BigEndian::read_i64(self.take_fixed(8)?))
    }

    pub fn get_time_tag(&mut self) -> Result<TimeTag, OscError> {
        self.expect_tag(TypeTag::TimeTag)?;
        Ok(TimeTag::read_be(self.take_fixed(8)?))
    }

    pub fn get_double(&mut self) -> Result<f64, OscError> {
        self.expect_tag(TypeTag::Double)?;
        Ok(BigEndian::read_f64(self.take_fixed(8)?))
    }

    pub fn get_character(&mut self) -> Result<u8, OscError> {
        self.expect_tag(TypeTag::Character)?;
        Ok(self.take_fixed(4)?[3])
    }

    pub fn get_rgba_colour(&mut self) -> Result<RgbaColour, OscError> {
        self.expect_tag(TypeTag::RgbaColour)?;
        Ok(RgbaColour::read_be(self.take_fixed(4)?))
    }

    pub fn get_midi_message(&mut self) -> Result<MidiMessage, OscError> {
        self.expect_tag(TypeTag::MidiMessage)?;
        Ok(MidiMessage::read_be(self.take_fixed(4)?))
    }

    /// Reads a `s`/`S` argument. Cursors are left untouched on failure.
    pub fn get_string(&mut self) -> Result<&str, OscError> {
        match self.current_tag() {
            Some(TypeTag::String) | Some(TypeTag::AlternateString) => {}
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "get_string called with no arguments left");
                return Err(OscError::NoArgumentsAvailable);
            }
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, found = ?t, "get_string found a non-string argument");
                return Err(OscError::UnexpectedArgumentType);
            }
        }
        let mut local = self.arg_cursor;
        let start = local;
        while local < self.arguments_len && self.arguments[local] != 0 {
            local += 1;
        }
        if local >= self.arguments_len {
            warn!(error = %OscError::MessageTooShortForArgumentType, "string argument missing its null terminator");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        let end = local;
        local = padded_len(local + 1 - start) + start;
        if local > self.arguments_len {
            warn!(error = %OscError::MessageTooShortForArgumentType, "string argument's padding runs past the message end");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        self.arg_cursor = local;
        self.tag_cursor += 1;
        std::str::from_utf8(&self.arguments[start..end]).map_err(|e| {
            warn!(error = %OscError::MessageTooShortForArgumentType, utf8_error = %e, "string argument is not valid UTF-8");
            OscError::MessageTooShortForArgumentType
        })
    }

    /// Reads a `b` argument. Cursors are left untouched on failure.
    pub fn get_blob(&mut self) -> Result<&[u8], OscError> {
        self.expect_tag(TypeTag::Blob)?;
        if self.arg_cursor + 4 > self.arguments_len {
            warn!(error = %OscError::MessageTooShortForArgumentType, "message too short for a blob's size prefix");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        let size = BigEndian::read_i32(&self.arguments[self.arg_cursor..self.arg_cursor + 4]);
        if size < 0 {
            warn!(error = %OscError::MessageTooShortForArgumentType, size, "blob declared a negative size");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        let size = size as usize;
        let data_start = self.arg_cursor + 4;
        if data_start + size > self.arguments_len {
            warn!(error = %OscError::MessageTooShortForArgumentType, size, "blob data runs past the message end");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        let padded_end = padded_len(size) + data_start;
        if padded_end > self.arguments_len {
            warn!(error = %OscError::MessageTooShortForArgumentType, "blob padding runs past the message end");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        self.arg_cursor = padded_end;
        self.tag_cursor += 1;
        Ok(&self.arguments[data_start..data_start + size])
    }

    pub fn get_argument_as_int32(&mut self) -> Result<i32, OscError> {
        match self.current_tag() {
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "coercing getter called with no arguments left");
                Err(OscError::NoArgumentsAvailable)
            }
            Some(TypeTag::Int32) => self.get_int32(),
            Some(TypeTag::Float32) => Ok(self.get_float32()? as i32),
            Some(TypeTag::Int64) => Ok(self.get_int64()? as i32),
            Some(TypeTag::TimeTag) => Ok(self.get_time_tag()?.0 as i32),
            Some(TypeTag::Double) => Ok(self.get_double()? as i32),
            Some(TypeTag::Character) => Ok(self.get_character()? as i32),
            Some(TypeTag::True) => {
                self.tag_cursor += 1;
                Ok(1)
            }
            Some(TypeTag::False) | Some(TypeTag::Nil) => {
                self.tag_cursor += 1;
                Ok(0)
            }
            Some(TypeTag::Infinitum) => {
                self.tag_cursor += 1;
                Ok(i32::MAX)
            }
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, found = ?t, "argument type not coercible to the requested type");
                Err(OscError::UnexpectedArgumentType)
            }
        }
    }

    pub fn get_argument_as_float32(&mut self) -> Result<f32, OscError> {
        match self.current_tag() {
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "coercing getter called with no arguments left");
                Err(OscError::NoArgumentsAvailable)
            }
            Some(TypeTag::Int32) => Ok(self.get_int32()? as f32),
            Some(TypeTag::Float32) => self.get_float32(),
            Some(TypeTag::Int64) => Ok(self.get_int64()? as f32),
            Some(TypeTag::TimeTag) => Ok(self.get_time_tag()?.0 as f32),
            Some(TypeTag::Double) => Ok(self.get_double()? as f32),
            Some(TypeTag::Character) => Ok(self.get_character()? as f32),
            Some(TypeTag::True) => {
                self.tag_cursor += 1;
                Ok(1.0)
            }
            Some(TypeTag::False) | Some(TypeTag::Nil) => {
                self.tag_cursor += 1;
                Ok(0.0)
            }
            Some(TypeTag::Infinitum) => {
                self.tag_cursor += 1;
                Ok(f32::INFINITY)
            }
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, found = ?t, "argument type not coercible to the requested type");
                Err(OscError::UnexpectedArgumentType)
            }
        }
    }

    /// Coerces the current argument into a string, writing it (with a null
    /// terminator) into `destination`. Returns the number of bytes written,
    /// not including the terminator.
    pub fn get_argument_as_string(&mut self, destination: &mut [u8]) -> Result<usize, OscError> {
        match self.current_tag() {
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "coercing getter called with no arguments left");
                Err(OscError::NoArgumentsAvailable)
            }
            Some(TypeTag::String) | Some(TypeTag::AlternateString) => {
                let s = self.get_string()?;
                if destination.len() < s.len() + 1 {
                    warn!(error = %OscError::DestinationTooSmall, needed = s.len() + 1, have = destination.len(), "get_argument_as_string destination too small");
                    return Err(OscError::DestinationTooSmall);
                }
                destination[..s.len()].copy_from_slice(s.as_bytes());
                destination[s.len()] = 0;
                Ok(s.len())
            }
            Some(TypeTag::Character) => {
                let c = self.get_character()?;
                if destination.len() < 2 {
                    warn!(error = %OscError::DestinationTooSmall, "get_argument_as_string destination too small for a character");
                    return Err(OscError::DestinationTooSmall);
                }
                destination[0] = c;
                destination[1] = 0;
                Ok(1)
            }
            Some(TypeTag::Blob) => {
                let blob_len = self.peek_blob_len()?;
                if destination.len() < blob_len + 1 {
                    warn!(error = %OscError::DestinationTooSmall, needed = blob_len + 1, have = destination.len(), "get_argument_as_string destination too small for a blob");
                    return Err(OscError::DestinationTooSmall);
                }
                let blob = self.get_blob()?;
                destination[..blob.len()].copy_from_slice(blob);
                destination[blob.len()] = 0;
                Ok(blob.len())
            }
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, found = ?t, "argument type not coercible to the requested type");
                Err(OscError::UnexpectedArgumentType)
            }
        }
    }

    fn peek_blob_len(&self) -> Result<usize, OscError> {
        if self.arg_cursor + 4 > self.arguments_len {
            warn!(error = %OscError::MessageTooShortForArgumentType, "message too short to peek a blob's size prefix");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        let size = BigEndian::read_i32(&self.arguments[self.arg_cursor..self.arg_cursor + 4]);
        if size < 0 {
            warn!(error = %OscError::MessageTooShortForArgumentType, size, "blob declared a negative size");
            return Err(OscError::MessageTooShortForArgumentType);
        }
        Ok(size as usize)
    }

    /// Coerces the current argument into a blob, writing it into
    /// `destination`. Returns the number of bytes written.
    pub fn get_argument_as_blob(&mut self, destination: &mut [u8]) -> Result<usize, OscError> {
        match self.current_tag() {
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "coercing getter called with no arguments left");
                Err(OscError::NoArgumentsAvailable)
            }
            Some(TypeTag::Blob) => {
                let blob_len = self.peek_blob_len()?;
                if destination.len() < blob_len {
                    warn!(error = %OscError::DestinationTooSmall, needed = blob_len, have = destination.len(), "get_argument_as_blob destination too small");
                    return Err(OscError::DestinationTooSmall);
                }
                let blob = self.get_blob()?;
                destination[..blob.len()].copy_from_slice(blob);
                Ok(blob.len())
            }
            Some(TypeTag::String) | Some(TypeTag::AlternateString) => {
                let s = self.get_string()?;
                if destination.len() < s.len() {
                    warn!(error = %OscError::DestinationTooSmall, needed = s.len(), have = destination.len(), "get_argument_as_blob destination too small");
                    return Err(OscError::DestinationTooSmall);
                }
                destination[..s.len()].copy_from_slice(s.as_bytes());
                Ok(s.len())
            }
            Some(TypeTag::Character) => {
                let c = self.get_character()?;
                if destination.is_empty() {
                    warn!(error = %OscError::DestinationTooSmall, "get_argument_as_blob destination too small for a character");
                    return Err(OscError::DestinationTooSmall);
                }
                destination[0] = c;
                Ok(1)
            }
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, found = ?t, "argument type not coercible to the requested type");
                Err(OscError::UnexpectedArgumentType)
            }
        }
    }

    pub fn get_argument_as_int64(&mut self) -> Result<i64, OscError> {
        match self.current_tag() {
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "coercing getter called with no arguments left");
                Err(OscError::NoArgumentsAvailable)
            }
            Some(TypeTag::Int32) => Ok(self.get_int32()? as i64),
            Some(TypeTag::Float32) => Ok(self.get_float32()? as i64),
            Some(TypeTag::Int64) => self.get_int64(),
            Some(TypeTag::TimeTag) => Ok(self.get_time_tag()?.0 as i64),
            Some(TypeTag::Double) => Ok(self.get_double()? as i64),
            Some(TypeTag::Character) => Ok(self.get_character()? as i64),
            Some(TypeTag::True) => {
                self.tag_cursor += 1;
                Ok(1)
            }
            Some(TypeTag::False) | Some(TypeTag::Nil) => {
                self.tag_cursor += 1;
                Ok(0)
            }
            Some(TypeTag::Infinitum) => {
                self.tag_cursor += 1;
                Ok(i64::MAX)
            }
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, found = ?t, "argument type not coercible to the requested type");
                Err(OscError::UnexpectedArgumentType)
            }
        }
    }

    pub fn get_argument_as_double(&mut self) -> Result<f64, OscError> {
        match self.current_tag() {
            None => {
                debug!(error = %OscError::NoArgumentsAvailable, "coercing getter called with no arguments left");
                Err(OscError::NoArgumentsAvailable)
            }
            Some(TypeTag::Int32) => Ok(self.get_int32()? as f64),
            Some(TypeTag::Float32) => Ok(self.get_float32()? as f64),
            Some(TypeTag::Int64) => Ok(self.get_int64()? as f64),
            Some(TypeTag::TimeTag) => Ok(self.get_time_tag()?.0 as f64),
            Some(TypeTag::Double) => self.get_double(),
            Some(TypeTag::Character) => Ok(self.get_character()? as f64),
            Some(TypeTag::True) => {
                self.tag_cursor += 1;
                Ok(1.0)
            }
            Some(TypeTag::False) | Some(TypeTag::Nil) => {
                self.tag_cursor += 1;
                Ok(0.0)
            }
            Some(TypeTag::Infinitum) => {
                self.tag_cursor += 1;
                Ok(f64::INFINITY)
            }
            Some(t) => {
                debug!(error = %OscError::UnexpectedArgumentType, found = ?t, "argument type not coercible to the requested type");
                Err(OscError::UnexpectedArgumentType)
            }
        }
    }

    pub fn get_argument_as_bool(&mut self) -> Result<bool, OscError> {
        Ok(self.get_argument_as_int32()? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_serialize_roundtrip() {
        let mut msg = Message::new("/foo/bar").unwrap();
        msg.add_int32(42).unwrap();
        msg.add_string("hi").unwrap();
        msg.add_true().unwrap();

        let mut buf = [0u8; 64];
        let n = msg.serialize(&mut buf).unwrap();
        assert_eq!(n, msg.size());

        let mut parsed = Message::from_bytes(&buf[..n]).unwrap();
        assert_eq!(parsed.address_pattern(), "/foo/bar");
        assert_eq!(parsed.type_tag_string(), ",isT");
        assert_eq!(parsed.get_int32().unwrap(), 42);
        assert_eq!(parsed.get_string().unwrap(), "hi");
        assert_eq!(parsed.get_argument_type(), Some(TypeTag::True));
    }

    #[test]
    fn non_destructive_failure_on_wrong_type() {
        let mut msg = Message::new("/foo").unwrap();
        msg.add_int32(7).unwrap();
        let mut buf = [0u8; 32];
        let n = msg.serialize(&mut buf).unwrap();
        let mut parsed = Message::from_bytes(&buf[..n]).unwrap();
        assert!(parsed.get_string().is_err());
        // Cursor untouched: the int32 getter still works afterwards.
        assert_eq!(parsed.get_int32().unwrap(), 7);
    }

    #[test]
    fn address_too_long_rejected() {
        let long = "/".to_string() + &"a".repeat(L_ADDR);
        let mut msg = Message::new("").unwrap();
        assert!(matches!(
            msg.append_address(&long),
            Err(OscError::AddressPatternTooLong)
        ));
    }

    #[test]
    fn too_many_arguments_rejected() {
        let mut msg = Message::new("/x").unwrap();
        for _ in 0..N_ARG {
            msg.add_true().unwrap();
        }
        assert!(matches!(msg.add_true(), Err(OscError::TooManyArguments)));
    }

    #[test]
    fn coercion_infinitum_to_float() {
        let mut msg = Message::new("/x").unwrap();
        msg.add_infinitum().unwrap();
        let mut buf = [0u8; 16];
        let n = msg.serialize(&mut buf).unwrap();
        let mut parsed = Message::from_bytes(&buf[..n]).unwrap();
        assert_eq!(parsed.get_argument_as_float32().unwrap(), f32::INFINITY);
    }

    // Scenario A.
    #[test]
    fn scenario_a_empty_argument_message() {
        let msg = Message::new("/x").unwrap();
        let mut buf = [0u8; 16];
        let n = msg.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x2f, 0x78, 0x00, 0x00, 0x2c, 0x00, 0x00, 0x00]);

        let mut parsed = Message::from_bytes(&buf[..n]).unwrap();
        assert_eq!(parsed.address_pattern(), "/x");
        assert!(!parsed.is_argument_available());
        assert_eq!(parsed.number_of_arguments(), 0);
    }

    // Scenario B.
    #[test]
    fn scenario_b_int32_and_float32_message() {
        let mut msg = Message::new("/foo").unwrap();
        msg.add_int32(0x1234_5678).unwrap();
        msg.add_float32(1.0).unwrap();
        let mut buf = [0u8; 20];
        let n = msg.serialize(&mut buf).unwrap();
        assert_eq!(n, 20);
        assert_eq!(
            &buf[..n],
            &[
                0x2f, 0x66, 0x6f, 0x6f, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x69, 0x66, 0x00, 0x12,
                0x34, 0x56, 0x78, 0x3f, 0x80, 0x00, 0x00,
            ]
        );

        let mut parsed = Message::from_bytes(&buf[..n]).unwrap();
        assert_eq!(parsed.get_int32().unwrap(), 0x1234_5678);
        assert_eq!(parsed.get_float32().unwrap(), 1.0);
    }

    // Scenario C.
    #[test]
    fn scenario_c_blob_of_length_five() {
        let mut msg = Message::new("/b").unwrap();
        msg.add_blob(&[0x00, 0x01, 0x02, 0x03, 0x04]).unwrap();
        let mut buf = [0u8; 32];
        let n = msg.serialize(&mut buf).unwrap();

        let arg_bytes = &buf[n - 12..n];
        assert_eq!(
            arg_bytes,
            &[0x00, 0x00, 0x00, 0x05, 0x00, 0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x00]
        );

        let mut parsed = Message::from_bytes(&buf[..n]).unwrap();
        assert_eq!(parsed.get_blob().unwrap(), &[0x00, 0x01, 0x02, 0x03, 0x04]);
    }
}
