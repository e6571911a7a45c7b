// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters implementing [`SceneGraph`](crate::types::SceneGraph) for other Understory crates.
//!
//! Enabled via feature flags to keep the core small and `no_std` by default.

#[cfg(feature = "scene3d_adapter")]
pub mod scene3d;
