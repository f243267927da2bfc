//! Locating the JPEG image inside a camera datagram.
//!
//! The camera prefixes every datagram with a variable-length vendor header.
//! The image data starts somewhere after the first 130 bytes, but at last in
//! 320 bytes, so the scan looks for the JPEG Start-Of-Image marker in that
//! window. When several marker-like byte pairs occur in the window, the last
//! one wins; the shipped camera firmware frames its packets such that this
//! scan lines up with the actual image start, so the tie-break must not be
//! changed without testing against real hardware.

/// JPEG Start-Of-Image marker, see
/// <https://en.wikipedia.org/wiki/JPEG_File_Interchange_Format>.
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// First byte offset the vendor header can end at.
pub const HEADER_SCAN_START: usize = 130;

/// Scan ceiling; the header never extends past this offset.
pub const HEADER_SCAN_CEILING: usize = 320;

/// Offset of the embedded JPEG data in `datagram`.
///
/// Scans `[130, min(320, len - 1))` for the SOI marker, keeping the last
/// match; defaults to 130 when no marker is found. Never reads outside the
/// datagram.
pub fn jpeg_offset(datagram: &[u8]) -> usize {
    let mut offset = HEADER_SCAN_START;
    let end = HEADER_SCAN_CEILING.min(datagram.len().saturating_sub(1));
    for k in HEADER_SCAN_START..end {
        if datagram[k] == JPEG_SOI[0] && datagram[k + 1] == JPEG_SOI[1] {
            offset = k;
        }
    }
    offset
}

/// The `[offset, len)` byte range holding the JPEG image, empty when the
/// datagram is shorter than the default offset.
pub fn jpeg_payload(datagram: &[u8]) -> &[u8] {
    let offset = jpeg_offset(datagram);
    if offset >= datagram.len() {
        &[]
    } else {
        &datagram[offset..]
    }
}
