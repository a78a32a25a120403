/*
 * media_type.rs
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

//! Content-Type media type (RFC 9110) and response charset resolution.
//!
//! Only the `charset` parameter is of interest to the response engine: the
//! first one encountered wins and ends the parameter scan. A parameter that
//! fails to parse (including a degenerate `charset` itself) aborts the rest
//! of the scan without invalidating the type/subtype already found.

use super::grammar::{scan_quoted_string, scan_token, skip_cws};

/// Charset used when the header is absent, unparseable, or carries no
/// usable charset parameter.
pub const FALLBACK_CHARSET: &str = "UTF-8";

/// Parsed media type: `type/subtype` plus the charset parameter, if any.
#[derive(Debug, Clone)]
pub struct MediaType {
    primary_type: String,
    sub_type: String,
    charset: Option<String>,
}

impl MediaType {
    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// The recorded charset value, verbatim. A quoted empty value is
    /// `Some("")`; no charset parameter at all is `None`.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn is_mime_type(&self, primary: &str, sub: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(primary) && self.sub_type.eq_ignore_ascii_case(sub)
    }
}

/// Parse a Content-Type header value. None when there is no well-formed
/// `type/subtype` prefix.
pub fn parse_media_type(value: &str) -> Option<MediaType> {
    let rest = skip_cws(value.as_bytes());
    let (primary, rest) = scan_token(rest)?;
    let rest = skip_cws(rest);
    if rest.first() != Some(&b'/') {
        return None;
    }
    let rest = skip_cws(&rest[1..]);
    let (sub, rest) = scan_token(rest)?;
    let mut rest = skip_cws(rest);

    let mut charset = None;
    while rest.first() == Some(&b';') {
        rest = skip_cws(&rest[1..]);
        // tolerate empty parameters from doubled separators
        if rest.first() == Some(&b';') {
            continue;
        }
        let Some((name, after_name)) = scan_token(rest) else {
            break;
        };
        let after_name = skip_cws(after_name);
        if after_name.first() != Some(&b'=') {
            break;
        }
        let value_start = skip_cws(&after_name[1..]);
        let is_charset = name.eq_ignore_ascii_case(b"charset");
        if value_start.first() == Some(&b'"') {
            let Some((unescaped, after_value)) = scan_quoted_string(value_start) else {
                break;
            };
            if is_charset {
                // quoted value is used verbatim, even when empty
                charset = Some(String::from_utf8_lossy(&unescaped).into_owned());
                break;
            }
            rest = skip_cws(after_value);
        } else {
            let Some((value, after_value)) = scan_token(value_start) else {
                break;
            };
            if is_charset {
                charset = Some(String::from_utf8_lossy(value).into_owned());
                break;
            }
            rest = skip_cws(after_value);
        }
    }

    Some(MediaType {
        primary_type: String::from_utf8_lossy(primary).into_owned(),
        sub_type: String::from_utf8_lossy(sub).into_owned(),
        charset,
    })
}

/// Resolve the text charset for a response with the given Content-Type
/// header value, falling back to UTF-8 when the header is absent, does not
/// parse, or carries no non-empty charset. The returned label is not
/// validated here; the decoder decides whether it names a real encoding.
pub fn resolve_charset(content_type: Option<&str>) -> String {
    match content_type.and_then(parse_media_type) {
        Some(media_type) => match media_type.charset {
            Some(charset) if !charset.is_empty() => charset,
            _ => FALLBACK_CHARSET.to_string(),
        },
        None => FALLBACK_CHARSET.to_string(),
    }
}
