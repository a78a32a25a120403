/*
 * client.rs
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

//! Request dispatcher: the public REST surface.
//!
//! One operation per method and payload shape, all funneled through a
//! single send path that validates, defaults the content type, issues via
//! the transport, and registers the completion callback. Completion comes
//! back as `TransportEvent`s pushed into `dispatch` (or drained from a
//! tokio channel) on the thread that owns the client. The engine has no
//! locks because it has no concurrent access, only ordered event delivery.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::rest::context::Context;
use crate::rest::payload::{encode_form, Multipart, Payload, PayloadSource};
use crate::rest::registry::{PendingRegistry, ReplyCallback};
use crate::rest::reply::Reply;
use crate::rest::transport::{Method, ReplyId, Transport, TransportEvent, TransportRequest};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request under construction: URL plus headers.
///
/// Obtain with `RestRequest::new(url)`, add headers, then pass to one of
/// the `RestClient` operations.
pub struct RestRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RestRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header. Names may repeat; comparison is case-insensitive per HTTP.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
}

/// REST client: issues requests through a pluggable transport and routes
/// completion events to at-most-once callbacks and aggregate observers.
///
/// Affine to the thread that created it; completion is always delivered
/// later via `dispatch`/`drain` on that thread, never by blocking.
pub struct RestClient {
    transport: Option<Box<dyn Transport>>,
    registry: Rc<RefCell<PendingRegistry>>,
    replies: HashMap<ReplyId, Reply>,
    finished_observers: Vec<Box<dyn Fn(&Reply)>>,
    auto_delete: bool,
    transfer_timeout: Option<Duration>,
    owner_thread: ThreadId,
}

impl RestClient {
    /// Client without a transport; every operation warns and issues nothing
    /// until `set_transport` is called.
    pub fn new() -> Self {
        Self {
            transport: None,
            registry: Rc::new(RefCell::new(PendingRegistry::new())),
            replies: HashMap::new(),
            finished_observers: Vec::new(),
            auto_delete: false,
            transfer_timeout: None,
            owner_thread: thread::current().id(),
        }
    }

    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        let mut client = Self::new();
        client.transport = Some(transport);
        client
    }

    pub fn set_transport(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
    }

    // ── Request operations ───────────────────────────────────────────

    /// GET with no payload.
    pub fn get(
        &mut self,
        request: RestRequest,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(Method::Get, request, Payload::Empty, None, context, on_complete)
    }

    /// GET with a raw byte payload.
    pub fn get_with_body(
        &mut self,
        request: RestRequest,
        data: Vec<u8>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Get,
            request,
            Payload::Bytes(data),
            None,
            context,
            on_complete,
        )
    }

    /// GET with a JSON document payload.
    pub fn get_json(
        &mut self,
        request: RestRequest,
        document: &Value,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        let body = self.serialize_document(document)?;
        self.send_request(
            Method::Get,
            request,
            Payload::Bytes(body),
            Some(JSON_CONTENT_TYPE),
            context,
            on_complete,
        )
    }

    /// POST raw bytes.
    pub fn post(
        &mut self,
        request: RestRequest,
        data: Vec<u8>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Post,
            request,
            Payload::Bytes(data),
            None,
            context,
            on_complete,
        )
    }

    /// POST a JSON document, serialized compactly.
    pub fn post_json(
        &mut self,
        request: RestRequest,
        document: &Value,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        let body = self.serialize_document(document)?;
        self.send_request(
            Method::Post,
            request,
            Payload::Bytes(body),
            Some(JSON_CONTENT_TYPE),
            context,
            on_complete,
        )
    }

    /// POST an urlencoded form.
    pub fn post_form(
        &mut self,
        request: RestRequest,
        fields: &[(String, String)],
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Post,
            request,
            Payload::Bytes(encode_form(fields)),
            Some(FORM_CONTENT_TYPE),
            context,
            on_complete,
        )
    }

    /// POST a multipart/form-data body.
    pub fn post_multipart(
        &mut self,
        request: RestRequest,
        multipart: Multipart,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        let content_type = multipart.content_type();
        self.send_request(
            Method::Post,
            request,
            Payload::Bytes(multipart.encode()),
            Some(&content_type),
            context,
            on_complete,
        )
    }

    /// POST a streamed payload pulled from `source`.
    pub fn post_stream(
        &mut self,
        request: RestRequest,
        source: Box<dyn PayloadSource>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Post,
            request,
            Payload::Stream(source),
            None,
            context,
            on_complete,
        )
    }

    /// PUT raw bytes.
    pub fn put(
        &mut self,
        request: RestRequest,
        data: Vec<u8>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Put,
            request,
            Payload::Bytes(data),
            None,
            context,
            on_complete,
        )
    }

    /// PUT a JSON document, serialized compactly.
    pub fn put_json(
        &mut self,
        request: RestRequest,
        document: &Value,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        let body = self.serialize_document(document)?;
        self.send_request(
            Method::Put,
            request,
            Payload::Bytes(body),
            Some(JSON_CONTENT_TYPE),
            context,
            on_complete,
        )
    }

    /// PUT an urlencoded form.
    pub fn put_form(
        &mut self,
        request: RestRequest,
        fields: &[(String, String)],
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Put,
            request,
            Payload::Bytes(encode_form(fields)),
            Some(FORM_CONTENT_TYPE),
            context,
            on_complete,
        )
    }

    /// PUT a multipart/form-data body.
    pub fn put_multipart(
        &mut self,
        request: RestRequest,
        multipart: Multipart,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        let content_type = multipart.content_type();
        self.send_request(
            Method::Put,
            request,
            Payload::Bytes(multipart.encode()),
            Some(&content_type),
            context,
            on_complete,
        )
    }

    /// PUT a streamed payload.
    pub fn put_stream(
        &mut self,
        request: RestRequest,
        source: Box<dyn PayloadSource>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Put,
            request,
            Payload::Stream(source),
            None,
            context,
            on_complete,
        )
    }

    /// PATCH raw bytes.
    pub fn patch(
        &mut self,
        request: RestRequest,
        data: Vec<u8>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Patch,
            request,
            Payload::Bytes(data),
            None,
            context,
            on_complete,
        )
    }

    /// PATCH a JSON document, serialized compactly.
    pub fn patch_json(
        &mut self,
        request: RestRequest,
        document: &Value,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        let body = self.serialize_document(document)?;
        self.send_request(
            Method::Patch,
            request,
            Payload::Bytes(body),
            Some(JSON_CONTENT_TYPE),
            context,
            on_complete,
        )
    }

    /// DELETE with no payload.
    pub fn delete_resource(
        &mut self,
        request: RestRequest,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Delete,
            request,
            Payload::Empty,
            None,
            context,
            on_complete,
        )
    }

    /// HEAD with no payload.
    pub fn head(
        &mut self,
        request: RestRequest,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(Method::Head, request, Payload::Empty, None, context, on_complete)
    }

    /// Custom verb with a raw byte payload (may be empty).
    pub fn send_custom(
        &mut self,
        request: RestRequest,
        verb: impl Into<String>,
        data: Vec<u8>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        let payload = if data.is_empty() {
            Payload::Empty
        } else {
            Payload::Bytes(data)
        };
        self.send_request(
            Method::Other(verb.into()),
            request,
            payload,
            None,
            context,
            on_complete,
        )
    }

    /// Custom verb with a streamed payload.
    pub fn send_custom_stream(
        &mut self,
        request: RestRequest,
        verb: impl Into<String>,
        source: Box<dyn PayloadSource>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.send_request(
            Method::Other(verb.into()),
            request,
            Payload::Stream(source),
            None,
            context,
            on_complete,
        )
    }

    fn serialize_document(&self, document: &Value) -> Option<Vec<u8>> {
        match serde_json::to_vec(document) {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(error = %e, "request document serialization failed, request not issued");
                None
            }
        }
    }

    fn send_request(
        &mut self,
        method: Method,
        mut request: RestRequest,
        payload: Payload,
        default_content_type: Option<&str>,
        context: Option<&Context>,
        on_complete: Option<ReplyCallback>,
    ) -> Option<Reply> {
        self.verify_thread("send_request");
        let Some(transport) = self.transport.as_mut() else {
            warn!(url = request.url.as_str(), "no transport configured, request not issued");
            return None;
        };
        if let Some(content_type) = default_content_type {
            if !has_header(&request.headers, "content-type") {
                request
                    .headers
                    .push(("Content-Type".to_string(), content_type.to_string()));
            }
        }
        let id = transport.issue(TransportRequest {
            method,
            url: request.url,
            headers: request.headers,
            payload,
            timeout: self.transfer_timeout,
        });

        let reply = Reply::new(id);
        self.replies.insert(id, reply.clone());
        self.registry
            .borrow_mut()
            .register(id, context.map(|c| c.watch()), on_complete);
        if let Some(context) = context {
            let registry = Rc::downgrade(&self.registry);
            context.on_drop(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.borrow_mut().forget(id);
                }
            }));
        }
        Some(reply)
    }

    // ── Event handling ───────────────────────────────────────────────

    /// Feed one transport event. Events must arrive on the owning thread,
    /// in the order the transport emitted them per reply.
    pub fn dispatch(&mut self, event: TransportEvent) {
        self.verify_thread("dispatch");
        match event {
            TransportEvent::Headers {
                reply,
                status,
                headers,
            } => match self.replies.get(&reply) {
                Some(r) => r.set_meta(status, headers),
                None => debug!("headers for unknown reply {:?}", reply),
            },
            TransportEvent::Data { reply, data } => match self.replies.get(&reply) {
                Some(r) => r.append(&data),
                None => debug!("data for unknown reply {:?}", reply),
            },
            TransportEvent::Finished { reply } => self.finish(reply),
            TransportEvent::Destroyed { reply } => {
                self.registry.borrow_mut().forget(reply);
                self.replies.remove(&reply);
            }
        }
    }

    /// Drain every event currently queued on the channel. Non-blocking;
    /// call whenever the owning thread is ready to process completions.
    pub fn drain(&mut self, events: &mut mpsc::UnboundedReceiver<TransportEvent>) {
        while let Ok(event) = events.try_recv() {
            self.dispatch(event);
        }
    }

    fn finish(&mut self, id: ReplyId) {
        let Some(reply) = self.replies.get(&id).cloned() else {
            debug!("finish for unknown reply {:?}", id);
            self.registry.borrow_mut().forget(id);
            return;
        };
        reply.mark_finished();
        // remove-then-invoke: the registry borrow ends before the callback runs
        let callback = self.registry.borrow_mut().complete(id);
        if let Some(callback) = callback {
            callback(&reply);
        }
        for observer in &self.finished_observers {
            observer(&reply);
        }
        if self.auto_delete {
            self.replies.remove(&id);
        }
    }

    /// Drop a reply: abort its transfer if the transport can, forget its
    /// registration, release its state. No callback will fire for it.
    pub fn discard(&mut self, reply: &Reply) {
        self.verify_thread("discard");
        let id = reply.id();
        if let Some(transport) = self.transport.as_mut() {
            transport.abort(id);
        }
        self.registry.borrow_mut().forget(id);
        self.replies.remove(&id);
    }

    /// Ask the transport to abort every pending request. Registrations are
    /// removed as the transport signals each reply finished or destroyed.
    pub fn abort_all(&mut self) {
        self.verify_thread("abort_all");
        let ids = self.registry.borrow().ids();
        if let Some(transport) = self.transport.as_mut() {
            for id in ids {
                transport.abort(id);
            }
        }
    }

    // ── Observers and options ────────────────────────────────────────

    /// Observe every completed request, in addition to any per-request
    /// callback. Fires after the callback, which may already have consumed
    /// from the reply's buffer.
    pub fn subscribe_finished(&mut self, observer: impl Fn(&Reply) + 'static) {
        self.finished_observers.push(Box::new(observer));
    }

    /// Release reply state as soon as the finished notifications ran.
    /// Handles the caller still holds stay readable.
    pub fn set_auto_delete(&mut self, auto_delete: bool) {
        self.auto_delete = auto_delete;
    }

    pub fn auto_delete(&self) -> bool {
        self.auto_delete
    }

    /// Transfer timeout handed to the transport with each request.
    pub fn set_transfer_timeout(&mut self, timeout: Option<Duration>) {
        self.transfer_timeout = timeout;
    }

    pub fn transfer_timeout(&self) -> Option<Duration> {
        self.transfer_timeout
    }

    /// Number of requests awaiting completion.
    pub fn pending_requests(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Number of replies whose state is still held.
    pub fn active_replies(&self) -> usize {
        self.replies.len()
    }

    fn verify_thread(&self, operation: &str) {
        if thread::current().id() != self.owner_thread {
            warn!(operation, "RestClient used from a thread other than its owner");
            debug_assert!(false, "RestClient used from a foreign thread");
        }
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RestClient {
    fn drop(&mut self) {
        let pending = self.registry.borrow().len();
        if pending > 0 {
            warn!(pending, "RestClient dropped with unresolved requests");
        }
    }
}
