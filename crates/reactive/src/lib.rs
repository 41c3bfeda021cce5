// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rf-reactive: change-tracking state store
//!
//! Writes go through typed proxies inside `ReactiveEngine::apply`, so every
//! nested mutation is observed. Subscribers hear about each changing `apply`
//! exactly once, and `Derived` values renotify only when their result changes.

mod derived;
mod draft;
mod engine;
mod error;
mod subscription;

pub use derived::Derived;
pub use draft::{same_value, ChangeSet, Draft, FactsProxy, MetaProxy, Proxy, ReactiveState, Slice};
pub use engine::ReactiveEngine;
pub use error::ProxyError;
pub use subscription::Subscription;
