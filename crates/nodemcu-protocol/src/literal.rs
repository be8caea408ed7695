//! Lua string literal encoding.
//!
//! Every value sent to the interpreter (file names, file contents) is embedded
//! in a statement as a single-quoted Lua literal. The encoding is ASCII-only so
//! that a literal never contains the line terminator or any byte the remote
//! UART console might swallow:
//!
//! - `0x20..=0x7E` are copied verbatim, except `'` and `\`
//! - `'` and `\` become `\'` and `\\`
//! - everything else becomes `\xHH` (two uppercase hex digits)

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encode arbitrary bytes as a single-quoted Lua string literal.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    // Worst case every byte becomes a four byte `\xHH` escape
    let mut out = Vec::with_capacity(data.len() * 4 + 2);
    out.push(b'\'');
    for &byte in data {
        match byte {
            b'\'' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7E => out.push(byte),
            _ => {
                out.extend_from_slice(b"\\x");
                out.push(HEX_DIGITS[(byte >> 4) as usize]);
                out.push(HEX_DIGITS[(byte & 0x0F) as usize]);
            }
        }
    }
    out.push(b'\'');
    out
}

/// Encode a string (as UTF-8) as a single-quoted Lua string literal.
pub fn encode_str(text: &str) -> Vec<u8> {
    encode_bytes(text.as_bytes())
}
