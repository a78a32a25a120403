/*
 * lib.rs
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

//! Corriere core: the engine of a cross-platform REST client.
//!
//! Request dispatch with leak-safe, at-most-once completion callbacks
//! (`rest`), and response content negotiation: media-type parsing with
//! charset resolution (`headers`) plus incremental text decoding (`rest`).
//! The wire transport is a collaborator the embedder supplies.

pub mod headers;
pub mod rest;
