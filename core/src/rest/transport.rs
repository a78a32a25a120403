/*
 * transport.rs
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

//! Transport collaborator interface.
//!
//! The transport owns the wire: connections, TLS, redirects, timeouts. The
//! dispatcher hands it a request, receives an opaque reply handle back, and
//! is told about progress through `TransportEvent`s delivered on the
//! dispatcher's owning thread (directly via `dispatch`, or queued through a
//! tokio unbounded channel and drained).

use std::time::Duration;

use crate::rest::payload::Payload;

/// Opaque identifier for an in-flight reply, assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyId(pub u64);

/// HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Other(s) => s,
        }
    }
}

/// Everything the transport needs to put one request on the wire.
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub payload: Payload,
    /// Transfer timeout; enforcement is the transport's business.
    pub timeout: Option<Duration>,
}

/// Progress signals for one reply. Plain data, safe to send across threads
/// into the dispatcher's event queue. Per handle the transport sends
/// Headers, any number of Data, then exactly one of Finished or Destroyed;
/// Destroyed may also follow Finished when the handle itself goes away.
#[derive(Debug)]
pub enum TransportEvent {
    /// Status and response headers became available.
    Headers {
        reply: ReplyId,
        status: u16,
        headers: Vec<(String, String)>,
    },
    /// A chunk of body data arrived.
    Data { reply: ReplyId, data: Vec<u8> },
    /// The response is complete.
    Finished { reply: ReplyId },
    /// The underlying handle is gone without completing (aborted, torn
    /// down); no completion will follow.
    Destroyed { reply: ReplyId },
}

/// Issues requests. Implementations do their I/O elsewhere (their own task,
/// thread, or event loop) and report back through `TransportEvent`s;
/// `issue` itself never blocks.
pub trait Transport {
    /// Start the request and return its handle.
    fn issue(&mut self, request: TransportRequest) -> ReplyId;

    /// Ask for an in-flight reply to be aborted. Default does nothing;
    /// transports without cancellation simply let the transfer run out.
    fn abort(&mut self, _reply: ReplyId) {}
}
