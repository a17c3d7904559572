// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fan-out of flag change notifications to in-process subscribers.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::debug;

use switchyard_flags_core::FlagEvent;

/// Default channel capacity.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for the flags broadcaster.
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
	/// Events a slow subscriber may lag behind before it starts missing them.
	pub channel_capacity: usize,
}

impl Default for BroadcasterConfig {
	fn default() -> Self {
		Self {
			channel_capacity: DEFAULT_CHANNEL_CAPACITY,
		}
	}
}

/// Publishes [`FlagEvent`]s to every subscriber.
///
/// Sending never blocks and never fails the caller: with no subscribers the
/// event is dropped.
#[derive(Debug)]
pub struct FlagsBroadcaster {
	sender: broadcast::Sender<FlagEvent>,
	total_events: AtomicU64,
}

impl FlagsBroadcaster {
	pub fn new(config: BroadcasterConfig) -> Self {
		let (sender, _receiver) = broadcast::channel(config.channel_capacity.max(1));
		Self {
			sender,
			total_events: AtomicU64::new(0),
		}
	}

	pub fn with_defaults() -> Self {
		Self::new(BroadcasterConfig::default())
	}

	pub fn subscribe(&self) -> broadcast::Receiver<FlagEvent> {
		self.sender.subscribe()
	}

	/// Returns the number of subscribers that received the event.
	pub fn broadcast(&self, event: FlagEvent) -> usize {
		let event_type = event.event_type();
		match self.sender.send(event) {
			Ok(count) => {
				self.total_events.fetch_add(1, Ordering::Relaxed);
				debug!(event_type, receiver_count = count, "Broadcast event to receivers");
				count
			}
			Err(_) => {
				debug!(event_type, "No receivers for broadcast");
				0
			}
		}
	}

	pub fn receiver_count(&self) -> usize {
		self.sender.receiver_count()
	}

	/// Events delivered to at least one subscriber.
	pub fn events_sent(&self) -> u64 {
		self.total_events.load(Ordering::Relaxed)
	}
}

impl Default for FlagsBroadcaster {
	fn default() -> Self {
		Self::with_defaults()
	}
}
