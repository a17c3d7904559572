// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Switchyard feature flags system.
//!
//! This crate provides the types shared by the evaluation engine
//! (`switchyard-flags`), configuration (`switchyard-config`) and the CLI.
//!
//! # Overview
//!
//! - A flag has a name and one of three persisted states: on, off or dynamic
//! - Dynamic flags are decided per call by a registered handler
//! - A declared [`FeatureManifest`] is synced against persisted records
//!
//! # Example
//!
//! ```
//! use switchyard_flags_core::{cache_key, EvaluationContext, FlagState};
//!
//! let ctx = EvaluationContext::new()
//!     .with_user_id("user123")
//!     .with_attribute("plan", serde_json::json!("enterprise"));
//!
//! assert_eq!("dynamic".parse::<FlagState>().unwrap(), FlagState::Dynamic);
//! assert_eq!(cache_key("features", "new-checkout"), "features.new-checkout");
//! # let _ = ctx;
//! ```

pub mod error;
pub mod evaluation;
pub mod event;
pub mod flag;
pub mod key;
pub mod manifest;
pub mod state;

pub use error::{FlagsError, Result};
pub use evaluation::EvaluationContext;
pub use event::FlagEvent;
pub use flag::Flag;
pub use key::{cache_key, KEY_SEPARATOR};
pub use manifest::{EnvironmentOverride, FeatureManifest};
pub use state::FlagState;
