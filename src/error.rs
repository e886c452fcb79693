//! The crate's single error type. Grounded on `OscError.h`/`OscError.c` for
//! the variant list, ordering, and messages, and on
//! `examples/asayers-pcarp/src/block/util.rs`'s `BlockError` for the
//! `thiserror`-based shape.

use thiserror::Error;

/// Every fallible operation in this crate returns this type. There is no
/// "ok" variant -- success is `Result::Ok`, unlike the source library's
/// `OscErrorNone`, since Rust already has a distinguished success channel.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OscError {
    #[cfg_attr(
        feature = "message-table",
        error("destination too small to contain the number of bytes available")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    DestinationTooSmall,

    #[cfg_attr(
        feature = "message-table",
        error("OSC packet or contents size must be a multiple of four")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    SizeIsNotMultipleOfFour,

    /// Kept for source-fidelity with `OscErrorCallbackFunctionUndefined`.
    /// Unreachable through this crate's own API: `Packet::dispatch` and
    /// `SlipDecoder::process_byte` take the callback as a `&mut dyn FnMut`
    /// argument rather than storing an `Option<fn>` field, so there is no
    /// "undefined callback" state to occupy. See DESIGN.md.
    #[cfg_attr(feature = "message-table", error("callback function undefined"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    CallbackFunctionUndefined,

    #[cfg_attr(
        feature = "message-table",
        error("not enough parts in address pattern to get the part at the specified index")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    NotEnoughPartsInAddressPattern,

    #[cfg_attr(
        feature = "message-table",
        error("address pattern does not start with a slash character")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    NoSlashAtStartOfMessage,

    #[cfg_attr(feature = "message-table", error("address pattern length exceeds L_ADDR"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    AddressPatternTooLong,

    #[cfg_attr(feature = "message-table", error("number of arguments exceeds N_ARG"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    TooManyArguments,

    #[cfg_attr(
        feature = "message-table",
        error("total arguments size exceeds MAX_ARGUMENTS_SIZE")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    ArgumentsSizeTooLarge,

    #[cfg_attr(feature = "message-table", error("address pattern is undefined"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    UndefinedAddressPattern,

    #[cfg_attr(
        feature = "message-table",
        error("message size too small to be a valid OSC message")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    MessageSizeTooSmall,

    #[cfg_attr(feature = "message-table", error("message size exceeds MAX_MESSAGE_SIZE"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    MessageSizeTooLarge,

    #[cfg_attr(
        feature = "message-table",
        error("source data ends before the end of the address pattern")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    SourceEndsBeforeEndOfAddressPattern,

    #[cfg_attr(
        feature = "message-table",
        error("source data ends before the start of the type tag string")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    SourceEndsBeforeStartOfTypeTagString,

    #[cfg_attr(
        feature = "message-table",
        error("type tag string length exceeds MAX_TYPE_TAG_STRING_LENGTH")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    TypeTagStringTooLong,

    #[cfg_attr(
        feature = "message-table",
        error("source data ends before the end of the type tag string")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    SourceEndsBeforeEndOfTypeTagString,

    #[cfg_attr(feature = "message-table", error("unexpected end of source data"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    UnexpectedEndOfSource,

    #[cfg_attr(feature = "message-table", error("no arguments available"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    NoArgumentsAvailable,

    #[cfg_attr(feature = "message-table", error("unexpected argument type"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    UnexpectedArgumentType,

    #[cfg_attr(
        feature = "message-table",
        error("message is too short to contain the argument type")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    MessageTooShortForArgumentType,

    #[cfg_attr(
        feature = "message-table",
        error("not enough space available in the bundle to contain the contents")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    BundleFull,

    #[cfg_attr(
        feature = "message-table",
        error("bundle size too small to be a valid OSC bundle")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    BundleSizeTooSmall,

    #[cfg_attr(feature = "message-table", error("bundle size exceeds MAX_BUNDLE_SIZE"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    BundleSizeTooLarge,

    #[cfg_attr(
        feature = "message-table",
        error("bundle does not start with a hash character")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    NoHashAtStartOfBundle,

    #[cfg_attr(feature = "message-table", error("bundle element not available"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    BundleElementNotAvailable,

    #[cfg_attr(feature = "message-table", error("bundle element size cannot be negative"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    NegativeBundleElementSize,

    #[cfg_attr(
        feature = "message-table",
        error("bundle too short to contain the declared element size")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    InvalidElementSize,

    #[cfg_attr(feature = "message-table", error("contents are not a bundle or a message"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    InvalidContents,

    #[cfg_attr(feature = "message-table", error("packet size exceeds MAX_PACKET_SIZE"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    PacketSizeTooLarge,

    #[cfg_attr(feature = "message-table", error("contents size cannot be zero"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    ContentsEmpty,

    #[cfg_attr(
        feature = "message-table",
        error("encoded SLIP packet size exceeds the decoder buffer")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    EncodedSlipPacketTooLong,

    #[cfg_attr(feature = "message-table", error("unexpected byte after SLIP ESC byte"))]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    UnexpectedByteAfterSlipEsc,

    #[cfg_attr(
        feature = "message-table",
        error("decoded SLIP packet size exceeds MAX_PACKET_SIZE")
    )]
    #[cfg_attr(not(feature = "message-table"), error("OSC error."))]
    DecodedSlipPacketTooLong,
}

pub type Result<T> = std::result::Result<T, OscError>;
