/*
 * reply.rs
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

//! Reply: per-response state and the three consuming reads.
//!
//! One byte buffer per reply, grown by transport delivery and shrunk by
//! consumption. `read_body`, `read_json` and `read_text` may be intermixed;
//! each sees only bytes no earlier read (of any kind) consumed. Text
//! decoding is lazy: the charset is resolved and the decoder built on the
//! first `read_text`, and both live until the reply is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::{Bytes, BytesMut};
use serde_json::Value;
use tracing::warn;

use crate::headers::resolve_charset;
use crate::rest::decode::TextDecoder;
use crate::rest::transport::ReplyId;

/// Handle to one response. Cheap to clone; all clones share the state.
#[derive(Clone)]
pub struct Reply {
    inner: Rc<RefCell<ReplyInner>>,
}

struct ReplyInner {
    id: ReplyId,
    status: Option<u16>,
    headers: Vec<(String, String)>,
    buffer: BytesMut,
    finished: bool,
    decoder: Option<TextDecoder>,
    text_failed: bool,
}

impl Reply {
    pub(crate) fn new(id: ReplyId) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ReplyInner {
                id,
                status: None,
                headers: Vec::new(),
                buffer: BytesMut::new(),
                finished: false,
                decoder: None,
                text_failed: false,
            })),
        }
    }

    pub fn id(&self) -> ReplyId {
        self.inner.borrow().id
    }

    /// HTTP status, once the transport delivered the response headers.
    pub fn status(&self) -> Option<u16> {
        self.inner.borrow().status
    }

    pub fn is_success(&self) -> bool {
        matches!(self.inner.borrow().status, Some(code) if (200..300).contains(&code))
    }

    pub fn is_finished(&self) -> bool {
        self.inner.borrow().finished
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.borrow().header(name)
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        self.inner.borrow().headers.clone()
    }

    pub fn content_type(&self) -> Option<String> {
        self.header("content-type")
    }

    /// Bytes buffered but not yet consumed by any read.
    pub fn bytes_available(&self) -> usize {
        self.inner.borrow().buffer.len()
    }

    /// Return and remove everything currently buffered. Empty when no new
    /// data arrived since the last read.
    pub fn read_body(&self) -> Bytes {
        self.inner.borrow_mut().buffer.split().freeze()
    }

    /// Parse the remaining body as a JSON document. `Ok(None)` until the
    /// response has finished, with the buffer left untouched. Once
    /// finished, all remaining bytes are consumed and parsed; a parse
    /// failure comes back as the error value (the bytes are consumed
    /// regardless).
    pub fn read_json(&self) -> Result<Option<Value>, serde_json::Error> {
        self.inner.borrow_mut().read_json()
    }

    /// Decode the currently buffered bytes as text, consuming them. The
    /// charset comes from the Content-Type header (UTF-8 fallback) on the
    /// first call. An unsupported charset or a malformed sequence makes
    /// this and every later call return an empty string, without consuming
    /// further input.
    pub fn read_text(&self) -> String {
        self.inner.borrow_mut().read_text()
    }

    pub(crate) fn set_meta(&self, status: u16, headers: Vec<(String, String)>) {
        let mut inner = self.inner.borrow_mut();
        inner.status = Some(status);
        inner.headers = headers;
    }

    pub(crate) fn append(&self, data: &[u8]) {
        self.inner.borrow_mut().buffer.extend_from_slice(data);
    }

    pub(crate) fn mark_finished(&self) {
        self.inner.borrow_mut().finished = true;
    }
}

impl ReplyInner {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn read_json(&mut self) -> Result<Option<Value>, serde_json::Error> {
        if !self.finished {
            return Ok(None);
        }
        let data = self.buffer.split();
        serde_json::from_slice(&data).map(Some)
    }

    fn read_text(&mut self) -> String {
        if self.text_failed {
            return String::new();
        }
        if self.decoder.is_none() {
            let charset = resolve_charset(self.header("content-type").as_deref());
            let Some(decoder) = TextDecoder::new(&charset) else {
                warn!(
                    charset = charset.as_str(),
                    "unsupported charset in reply {:?}, text reads disabled", self.id
                );
                self.text_failed = true;
                return String::new();
            };
            self.decoder = Some(decoder);
        }
        let data = self.buffer.split();
        match self.decoder.as_mut().and_then(|decoder| decoder.decode(&data)) {
            Some(text) => text,
            None => {
                warn!("text decoding failed for reply {:?}, further reads return empty", self.id);
                self.text_failed = true;
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply_with_content_type(content_type: &str) -> Reply {
        let reply = Reply::new(ReplyId(1));
        reply.set_meta(200, vec![("Content-Type".to_string(), content_type.to_string())]);
        reply
    }

    #[test]
    fn read_body_consumes() {
        let reply = Reply::new(ReplyId(1));
        reply.append(b"abc");
        assert_eq!(reply.read_body(), Bytes::from_static(b"abc"));
        assert!(reply.read_body().is_empty());
        reply.append(b"def");
        assert_eq!(reply.read_body(), Bytes::from_static(b"def"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let reply = reply_with_content_type("application/json");
        assert_eq!(reply.header("CONTENT-TYPE").as_deref(), Some("application/json"));
        assert_eq!(reply.content_type().as_deref(), Some("application/json"));
        assert!(reply.header("etag").is_none());
        assert_eq!(reply.status(), Some(200));
        assert!(reply.is_success());
    }

    #[test]
    fn json_not_ready_before_finish() {
        let reply = reply_with_content_type("application/json");
        reply.append(b"{\"a\":1}");
        assert!(reply.read_json().unwrap().is_none());
        // buffer was left alone
        assert_eq!(reply.bytes_available(), 7);
    }

    #[test]
    fn json_after_finish() {
        let reply = reply_with_content_type("application/json");
        reply.append(b"{\"a\":1}");
        reply.mark_finished();
        assert_eq!(reply.read_json().unwrap(), Some(json!({"a": 1})));
        // buffer consumed: the next read parses nothing
        assert!(reply.read_json().is_err());
    }

    #[test]
    fn json_parse_error_still_consumes() {
        let reply = reply_with_content_type("application/json");
        reply.append(b"not json");
        reply.mark_finished();
        assert!(reply.read_json().is_err());
        assert_eq!(reply.bytes_available(), 0);
    }

    #[test]
    fn text_concatenates_across_split_points() {
        let data = "caf\u{E9} \u{3053}\u{3093}".as_bytes();
        for split in 0..=data.len() {
            let reply = reply_with_content_type("text/plain; charset=utf-8");
            reply.append(&data[..split]);
            let mut text = reply.read_text();
            reply.append(&data[split..]);
            text.push_str(&reply.read_text());
            assert_eq!(text, "caf\u{E9} \u{3053}\u{3093}", "split at {}", split);
        }
    }

    #[test]
    fn text_defaults_to_utf8_without_header() {
        let reply = Reply::new(ReplyId(1));
        reply.append("h\u{E9}llo".as_bytes());
        assert_eq!(reply.read_text(), "h\u{E9}llo");
    }

    #[test]
    fn text_honors_quoted_charset() {
        let reply = reply_with_content_type("text/plain; charset=\"iso-8859-1\"");
        reply.append(&[0xE9]);
        assert_eq!(reply.read_text(), "\u{E9}");
    }

    #[test]
    fn unsupported_charset_is_sticky_and_does_not_consume() {
        let reply = reply_with_content_type("text/plain; charset=not-a-real-charset");
        reply.append(b"data");
        assert_eq!(reply.read_text(), "");
        assert_eq!(reply.read_text(), "");
        // the bytes are still there for other reads
        assert_eq!(reply.read_body(), Bytes::from_static(b"data"));
    }

    #[test]
    fn decode_error_is_sticky_and_stops_consuming() {
        let reply = reply_with_content_type("text/plain; charset=utf-8");
        reply.append(&[0xFF]);
        assert_eq!(reply.read_text(), "");
        reply.append(b"fine");
        assert_eq!(reply.read_text(), "");
        assert_eq!(reply.bytes_available(), 4);
    }

    #[test]
    fn reads_share_one_buffer() {
        let reply = reply_with_content_type("text/plain; charset=utf-8");
        reply.append(b"ab");
        assert_eq!(reply.read_body(), Bytes::from_static(b"ab"));
        reply.append(b"cd");
        assert_eq!(reply.read_text(), "cd");
        assert!(reply.read_body().is_empty());
    }
}
