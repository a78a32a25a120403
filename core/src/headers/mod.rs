/*
 * mod.rs
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

//! HTTP header field parsing: RFC 9110 grammar primitives, media types,
//! charset resolution.

mod grammar;
mod media_type;

pub use grammar::{is_tchar, scan_quoted_string, scan_token, skip_comment, skip_cws, skip_ows};
pub use media_type::{parse_media_type, resolve_charset, MediaType, FALLBACK_CHARSET};
