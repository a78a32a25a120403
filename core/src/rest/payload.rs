/*
 * payload.rs
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

//! Request payload shapes: raw bytes, pull-streamed chunks, urlencoded
//! forms, multipart/form-data bodies.

use std::io;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Form component safe set: unreserved characters stay literal, space
/// becomes `+` (handled after encoding), everything else is escaped.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Pull source for a streamed request body. The transport calls
/// `next_chunk` until it returns `Ok(None)`.
pub trait PayloadSource {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Body of an outgoing request.
pub enum Payload {
    Empty,
    Bytes(Vec<u8>),
    Stream(Box<dyn PayloadSource>),
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

fn form_component(s: &str) -> String {
    utf8_percent_encode(s, FORM).to_string().replace("%20", "+")
}

/// Encode name/value pairs as application/x-www-form-urlencoded.
pub fn encode_form(fields: &[(String, String)]) -> Vec<u8> {
    let mut out = String::new();
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(&form_component(name));
        out.push('=');
        out.push_str(&form_component(value));
    }
    out.into_bytes()
}

/// One part of a multipart body.
struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// multipart/form-data body builder with a random boundary.
pub struct Multipart {
    boundary: String,
    parts: Vec<Part>,
}

impl Multipart {
    pub fn new() -> Self {
        let boundary: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        Self {
            boundary,
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Header value for the request: `multipart/form-data; boundary=...`.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Add a plain text field.
    pub fn add_text(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parts.push(Part {
            name: name.into(),
            filename: None,
            content_type: None,
            data: value.into().into_bytes(),
        });
        self
    }

    /// Add a file-style part with optional filename and content type.
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        filename: Option<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    ) -> &mut Self {
        self.parts.push(Part {
            name: name.into(),
            filename,
            content_type,
            data,
        });
        self
    }

    /// Serialize the body: each part between `--boundary` lines, closed by
    /// `--boundary--`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            let mut disposition =
                format!("Content-Disposition: form-data; name=\"{}\"", quote(&part.name));
            if let Some(filename) = &part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", quote(filename)));
            }
            disposition.push_str("\r\n");
            out.extend_from_slice(disposition.as_bytes());
            if let Some(content_type) = &part.content_type {
                out.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(&part.data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape quotes and backslashes in disposition parameter values.
fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
