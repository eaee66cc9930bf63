// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack and item registry.
//!
//! The registry owns the fixed item population and the ordered piles that
//! hold it. Each item is owned by exactly one stack or is in flight:
//!
//! - [`take_top`](Registry::take_top) pops a stack's top item and marks it
//!   [`Owner::InFlight`], converting its pose to scene space.
//! - [`land`](Registry::land) appends an in-flight item to a stack and
//!   converts its pose back into that stack's local space.
//!
//! No other operation reassigns ownership.
//!
//! Items are stored in struct-of-arrays layout indexed by [`ItemId`]; stack
//! sequences are ordered bottom to top, which is also their draw order.
//!
//! # Dirty tracking
//!
//! Mutations mark the channels in [`dirty`](crate::dirty), and
//! [`evaluate`](Registry::evaluate) drains them into [`FrameChanges`] once
//! per frame for the [`Presenter`](crate::backend::Presenter).

mod evaluate;
mod id;
mod store;

pub use evaluate::FrameChanges;
pub use id::{ItemId, StackId, VisualKey};
pub use store::{Owner, Registry};
