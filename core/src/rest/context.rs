/*
 * context.rs
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

//! Callback context: a liveness guard tying completion callbacks to a
//! caller-owned object.
//!
//! Pass a `Context` when issuing a request and drop it to guarantee the
//! callback can never run afterwards. The dispatcher keeps only a weak
//! reference (resolve-or-null, never dangling) plus a drop hook that
//! removes the registration as soon as the context dies.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Caller-owned guard. Dropping it suppresses every callback registered
/// against it and forgets the pending registrations.
pub struct Context {
    inner: Rc<ContextInner>,
}

pub(crate) struct ContextInner {
    hooks: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ContextInner {
                hooks: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn watch(&self) -> Weak<ContextInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn on_drop(&self, hook: Box<dyn FnOnce()>) {
        self.inner.hooks.borrow_mut().push(hook);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        for hook in self.hooks.take() {
            hook();
        }
    }
}
