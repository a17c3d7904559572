// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notifications emitted when persisted flag state changes.

use serde::{Deserialize, Serialize};

use crate::flag::Flag;

/// Event published to subscribers after a successful state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum FlagEvent {
	/// Carries the full record as it was persisted.
	FlagUpdated(Flag),
}

impl FlagEvent {
	pub fn flag_updated(flag: Flag) -> Self {
		FlagEvent::FlagUpdated(flag)
	}

	pub fn event_type(&self) -> &'static str {
		match self {
			FlagEvent::FlagUpdated(_) => "flag_updated",
		}
	}

	pub fn flag(&self) -> &Flag {
		match self {
			FlagEvent::FlagUpdated(flag) => flag,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::FlagState;

	#[test]
	fn test_event_type_matches_serialized_tag() {
		let event = FlagEvent::flag_updated(Flag::new("some-feature", FlagState::On).unwrap());
		let json = serde_json::to_string(&event).unwrap();
		assert!(json.contains(&format!(r#""event":"{}""#, event.event_type())));
		assert!(json.contains(r#""state":"on""#));
	}

	#[test]
	fn test_flag_accessor() {
		let flag = Flag::new("some-feature", FlagState::Off).unwrap();
		let event = FlagEvent::flag_updated(flag.clone());
		assert_eq!(event.flag(), &flag);
	}
}
