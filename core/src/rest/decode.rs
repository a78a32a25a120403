/*
 * decode.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Corriere, a cross-platform REST client.
 *
 * Corriere is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Corriere is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Corriere.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Incremental response text decoding.
//!
//! One decoder per response, created on the first text read and fed each
//! newly arrived chunk. Partial multi-byte sequences are carried in the
//! converter between calls, so reads concatenate to the same string no
//! matter where the chunk boundaries fall. A malformed sequence makes the
//! decoder fail sticky: every later call reports failure too.

use encoding_rs::{Decoder, DecoderResult, Encoding};

/// Stateful charset decoder for one response body.
pub struct TextDecoder {
    decoder: Decoder,
    failed: bool,
}

impl TextDecoder {
    /// Construct a decoder for a charset label (WHATWG label matching,
    /// case-insensitive). None when the label names no known encoding.
    pub fn new(label: &str) -> Option<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())?;
        Some(Self {
            decoder: encoding.new_decoder(),
            failed: false,
        })
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Decode one chunk. The stream is never finalized: a trailing partial
    /// sequence stays pending for the next call. None on a malformed
    /// sequence, and on every call after one.
    pub fn decode(&mut self, input: &[u8]) -> Option<String> {
        if self.failed {
            return None;
        }
        let Some(capacity) = self
            .decoder
            .max_utf8_buffer_length_without_replacement(input.len())
        else {
            self.failed = true;
            return None;
        };
        let mut output = String::with_capacity(capacity);
        let (result, _read) =
            self.decoder
                .decode_to_string_without_replacement(input, &mut output, false);
        match result {
            DecoderResult::InputEmpty => Some(output),
            DecoderResult::Malformed(_, _) | DecoderResult::OutputFull => {
                self.failed = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_label() {
        assert!(TextDecoder::new("not-a-real-charset").is_none());
        assert!(TextDecoder::new("utf-8").is_some());
        assert!(TextDecoder::new("  Shift_JIS  ").is_some());
    }

    #[test]
    fn utf8_split_across_multibyte_boundary() {
        let mut decoder = TextDecoder::new("utf-8").unwrap();
        // "héllo" split in the middle of the two-byte é
        assert_eq!(decoder.decode(b"h\xC3").unwrap(), "h");
        assert_eq!(decoder.decode(b"\xA9llo").unwrap(), "\u{E9}llo");
    }

    #[test]
    fn shift_jis_split() {
        let mut decoder = TextDecoder::new("shift_jis").unwrap();
        assert_eq!(decoder.decode(&[0x82]).unwrap(), "");
        assert_eq!(decoder.decode(&[0xB1]).unwrap(), "\u{3053}");
    }

    #[test]
    fn latin1_is_windows_1252() {
        let mut decoder = TextDecoder::new("iso-8859-1").unwrap();
        assert_eq!(decoder.decode(&[0xE9]).unwrap(), "\u{E9}");
    }

    #[test]
    fn sticky_failure() {
        let mut decoder = TextDecoder::new("utf-8").unwrap();
        assert_eq!(decoder.decode(b"ok").unwrap(), "ok");
        assert!(decoder.decode(&[0xFF]).is_none());
        assert!(decoder.has_failed());
        // valid input after a failure still reports failure
        assert!(decoder.decode(b"more").is_none());
    }

    #[test]
    fn split_points_do_not_matter() {
        let data = "caf\u{E9} \u{3053}\u{3093}".as_bytes();
        for split in 0..=data.len() {
            let mut decoder = TextDecoder::new("utf-8").unwrap();
            let mut text = decoder.decode(&data[..split]).unwrap();
            text.push_str(&decoder.decode(&data[split..]).unwrap());
            assert_eq!(text, "caf\u{E9} \u{3053}\u{3093}", "split at {}", split);
        }
    }
}
