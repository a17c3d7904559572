// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod cache;
mod database;
mod environment;
mod logging;

pub use cache::{CacheConfig, CacheConfigLayer, DEFAULT_CACHE_PREFIX};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use environment::{EnvironmentConfig, EnvironmentConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};

pub(crate) use environment::parse_list;
