// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous multi-item transfer scheduling between stacks on a circle.
//!
//! `ferry_core` moves a fixed population of items between ordered piles
//! ("stacks"). A periodic scheduler launches items on arced flights, a
//! per-frame engine animates them toward a destination that is re-read every
//! frame, and piles repack with short eased tweens. It is `no_std` compatible
//! (with `alloc`), owns no window or timer, and leaves drawing to a host
//! [`Presenter`](backend::Presenter).
//!
//! # Architecture
//!
//! ```text
//!   host timer ──► TransferScene::on_timer() ──► TransferScheduler::poll()
//!                                                      │ Step
//!                                                      ▼
//!                                     FlightEngine::launch() ──► Registry::take_top()
//!
//!   host frame ──► TransferScene::on_frame()
//!                      │
//!                      ├─► RepackAnimator::advance()
//!                      ├─► FlightEngine::tick() ──► motion::sample()
//!                      │                       └──► Registry::land()
//!                      ▼
//!                  Registry::evaluate() ──► FrameChanges ──► Presenter::apply()
//! ```
//!
//! Both drivers read time through a [`SceneClock`](clock::SceneClock), so a
//! pause freezes everything and a resume continues without a jump.
//!
//! **[`registry`]**: Struct-of-arrays item storage, ordered stacks, and the
//! only two ownership moves (`take_top` and `land`).
//!
//! **[`layout`]**: Stack placement on the circle, pile offsets, and the
//! letterbox [`ViewportFit`](layout::ViewportFit).
//!
//! **[`repack`]**: Eased pile repacking, last request wins.
//!
//! **[`scheduler`]**: Cadence, rotation schedule and source policy.
//!
//! **[`flight`]**: Active flights, launch and per-frame tick.
//!
//! **[`motion`]**: Pure trajectory functions. **[`easing`]**: curves.
//!
//! **[`scene`]**: [`TransferScene`](scene::TransferScene) and the
//! [`SceneLifecycle`](scene::SceneLifecycle) hooks.
//!
//! **[`config`]** and **[`error`]**: [`SceneConfig`](config::SceneConfig)
//! and its validation.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) events with a
//! zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod clock;
pub mod config;
pub mod dirty;
pub mod easing;
pub mod error;
pub mod flight;
pub mod layout;
pub mod motion;
pub mod pose;
pub mod registry;
pub mod repack;
pub mod scene;
pub mod scheduler;
pub mod time;
pub mod trace;
