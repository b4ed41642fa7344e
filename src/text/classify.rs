//! Text encoding classification
//!
//! A host deciding how to decode a freshly loaded buffer needs one cheap
//! signal: is this plain ASCII, UTF-8 behind a BOM, or something it has to
//! hand to a heavier detector. Classification is a single pass and never
//! allocates.

/// The 3-byte UTF-8 byte order mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Coarse encoding classification of a raw text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextKind {
    /// Every byte is `<= 0x7F` and no BOM is present. Empty buffers
    /// classify as `Ascii`.
    Ascii,
    /// A UTF-8 BOM followed by pure ASCII content.
    AsciiWithUtf8Bom,
    /// A UTF-8 BOM followed by content containing bytes `>= 0x80`.
    Utf8WithBom,
    /// No BOM and at least one byte `>= 0x80`; the encoding cannot be
    /// determined here.
    Unknown,
}

impl TextKind {
    /// Classify a raw buffer.
    ///
    /// Only the UTF-8 BOM is recognized; UTF-16/32 marks and heuristic
    /// encoding detection are a caller concern.
    pub fn detect(buf: &[u8]) -> TextKind {
        if let Some(rest) = strip_utf8_bom(buf) {
            if is_ascii(rest) {
                TextKind::AsciiWithUtf8Bom
            } else {
                TextKind::Utf8WithBom
            }
        } else if is_ascii(buf) {
            TextKind::Ascii
        } else {
            TextKind::Unknown
        }
    }
}

/// Return the buffer content after the UTF-8 BOM, or `None` if the buffer
/// does not start with one.
pub fn strip_utf8_bom(buf: &[u8]) -> Option<&[u8]> {
    buf.strip_prefix(&UTF8_BOM)
}

#[inline]
fn is_ascii(buf: &[u8]) -> bool {
    buf.iter().all(|&b| b <= 0x7F)
}
