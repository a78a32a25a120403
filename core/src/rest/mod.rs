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

//! REST request dispatch and response access.
//!
//! `RestClient` issues requests through a pluggable `Transport` and routes
//! completion events back to at-most-once callbacks; `Reply` exposes the
//! response body as raw bytes, a JSON document, or incrementally decoded
//! text over one shared buffer.

mod client;
mod context;
mod decode;
mod payload;
mod registry;
mod reply;
mod transport;

pub use client::{RestClient, RestRequest};
pub use context::Context;
pub use decode::TextDecoder;
pub use payload::{encode_form, Multipart, Payload, PayloadSource};
pub use registry::ReplyCallback;
pub use reply::Reply;
pub use transport::{Method, ReplyId, Transport, TransportEvent, TransportRequest};
