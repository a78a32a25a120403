/*
 * registry.rs
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

//! Pending request registry: one entry per in-flight reply, holding the
//! optional callback and the weak context it is conditioned on.
//!
//! Exactly one of `complete`/`forget` removes an entry; the callback fires
//! at most once, and never after its context is gone. Removal happens under
//! the registry borrow and invocation after it: `complete` hands the
//! callback back to the dispatcher rather than calling it.

use std::collections::HashMap;
use std::rc::Weak;

use tracing::debug;

use crate::rest::context::ContextInner;
use crate::rest::reply::Reply;
use crate::rest::transport::ReplyId;

/// One-shot completion callback, invoked with the finished reply.
pub type ReplyCallback = Box<dyn FnOnce(&Reply)>;

struct PendingRequest {
    context: Option<Weak<ContextInner>>,
    callback: Option<ReplyCallback>,
}

#[derive(Default)]
pub(crate) struct PendingRegistry {
    entries: HashMap<ReplyId, PendingRequest>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        id: ReplyId,
        context: Option<Weak<ContextInner>>,
        callback: Option<ReplyCallback>,
    ) {
        let previous = self.entries.insert(id, PendingRequest { context, callback });
        if previous.is_some() {
            debug!("reply {:?} registered twice, earlier entry dropped", id);
        }
    }

    /// Remove the entry and return the callback to invoke, if any. Absent
    /// entries (already forgotten) and dead contexts both yield None.
    pub fn complete(&mut self, id: ReplyId) -> Option<ReplyCallback> {
        let Some(entry) = self.entries.remove(&id) else {
            debug!("completion for unknown reply {:?}", id);
            return None;
        };
        let callback = entry.callback?;
        if let Some(context) = &entry.context {
            if context.upgrade().is_none() {
                debug!("context destroyed before completion of {:?}, callback dropped", id);
                return None;
            }
        }
        Some(callback)
    }

    /// Remove the entry without any callback. Idempotent.
    pub fn forget(&mut self, id: ReplyId) {
        self.entries.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<ReplyId> {
        self.entries.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::context::Context;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn complete_returns_callback_once() {
        let mut registry = PendingRegistry::new();
        registry.register(ReplyId(1), None, Some(Box::new(|_| {})));
        assert!(registry.complete(ReplyId(1)).is_some());
        assert!(registry.complete(ReplyId(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn complete_unknown_is_none() {
        let mut registry = PendingRegistry::new();
        assert!(registry.complete(ReplyId(7)).is_none());
    }

    #[test]
    fn forget_is_idempotent_and_silent() {
        let fired = Rc::new(Cell::new(false));
        let fired2 = fired.clone();
        let mut registry = PendingRegistry::new();
        registry.register(ReplyId(1), None, Some(Box::new(move |_| fired2.set(true))));
        registry.forget(ReplyId(1));
        registry.forget(ReplyId(1));
        assert!(registry.complete(ReplyId(1)).is_none());
        assert!(!fired.get());
    }

    #[test]
    fn live_context_lets_callback_through() {
        let context = Context::new();
        let mut registry = PendingRegistry::new();
        registry.register(ReplyId(1), Some(context.watch()), Some(Box::new(|_| {})));
        assert!(registry.complete(ReplyId(1)).is_some());
    }

    #[test]
    fn dead_context_suppresses_callback() {
        let context = Context::new();
        let watch = context.watch();
        drop(context);
        let mut registry = PendingRegistry::new();
        registry.register(ReplyId(1), Some(watch), Some(Box::new(|_| {})));
        assert!(registry.complete(ReplyId(1)).is_none());
        // the entry is gone regardless
        assert!(registry.is_empty());
    }

    #[test]
    fn entry_without_callback() {
        let mut registry = PendingRegistry::new();
        registry.register(ReplyId(1), None, None);
        assert_eq!(registry.len(), 1);
        assert!(registry.complete(ReplyId(1)).is_none());
        assert!(registry.is_empty());
    }
}
