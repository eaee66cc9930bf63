// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for drawing a transfer scene.
//!
//! Ferry owns no window, no timer, and no renderer. A host embeds a
//! [`TransferScene`](crate::scene::TransferScene) and provides:
//!
//! - **Time**: a monotonic [`HostTime`](crate::time::HostTime) in nanoseconds
//!   passed to every driver call.
//! - **Frames**: one [`on_frame`](crate::scene::TransferScene::on_frame) per
//!   display refresh.
//! - **Timer**: [`on_timer`](crate::scene::TransferScene::on_timer) calls at
//!   least as often as the configured move interval; the scheduler decides
//!   whether a step is due.
//! - **Presenter**: an implementation of [`Presenter`] that mirrors the
//!   registry into a native tree (sprites, DOM nodes, a retained canvas).
//!
//! [`SceneLifecycle`](crate::scene::SceneLifecycle) covers entering, leaving
//! and resizing.

use crate::layout::ViewportFit;
use crate::registry::{FrameChanges, Registry};

/// Applies per-frame registry changes to a native presentation tree.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_display_refresh(now: HostTime) {
///     let mut tracer = Tracer::none();
///     scene.on_timer(now, &mut tracer);
///     if let Some(changes) = scene.on_frame(now, &mut tracer)
///         && let Some(registry) = scene.registry()
///     {
///         presenter.apply(registry, &scene.view_transform(), &changes);
///     }
/// }
/// ```
///
/// Items listed in [`FrameChanges::reparented`] changed owner: a presenter
/// that nests item sprites under stack containers moves them, and one that
/// draws a flat list re-reads [`Registry::world_pose`]. Draw order within a
/// stack is [`Registry::items`] order; in-flight items draw above all stacks.
pub trait Presenter {
    /// Applies `changes`, reading current values from `registry` and mapping
    /// design space to the window with `view`.
    fn apply(&mut self, registry: &Registry, view: &ViewportFit, changes: &FrameChanges);
}
