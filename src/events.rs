//! Progress events flowing from the sync engine to whoever renders them
//!
//! The engine never talks to a UI directly. Every component holds an
//! [`EventSink`] and pushes [`SyncEvent`] values into an unbounded channel;
//! the shell drains the matching [`EventReceiver`]. Log lines are mirrored
//! to `tracing` so headless runs keep a full trace.

use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::logging::*;

/// Events from the sync engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
	/// Human-readable progress or failure line
	Log(String),

	/// A debounce window closed with exactly one changed file (base name)
	SingleFileDetected { name: String },

	/// A debounce window closed with several changed files.
	/// Nothing is uploaded until the consumer confirms the batch.
	BatchDetected { description: String, paths: Vec<PathBuf> },

	/// The session ended abnormally; the consumer should return to idle
	StopMonitoring,
}

/// Sending half, cloned into every component that reports progress
#[derive(Debug, Clone)]
pub struct EventSink {
	tx: mpsc::UnboundedSender<SyncEvent>,
}

/// Receiving half, owned by the consumer
#[derive(Debug)]
pub struct EventReceiver {
	rx: mpsc::UnboundedReceiver<SyncEvent>,
}

/// Create a connected sink/receiver pair
pub fn channel() -> (EventSink, EventReceiver) {
	let (tx, rx) = mpsc::unbounded_channel();
	(EventSink { tx }, EventReceiver { rx })
}

impl EventSink {
	/// Send an event (ignores errors if the receiver is gone)
	pub fn send(&self, event: SyncEvent) {
		let _ = self.tx.send(event);
	}

	pub fn info(&self, message: impl Into<String>) {
		let message = message.into();
		info!("{}", message);
		self.send(SyncEvent::Log(message));
	}

	pub fn warn(&self, message: impl Into<String>) {
		let message = message.into();
		warn!("{}", message);
		self.send(SyncEvent::Log(message));
	}

	pub fn error(&self, message: impl Into<String>) {
		let message = message.into();
		error!("{}", message);
		self.send(SyncEvent::Log(message));
	}

	pub fn stop_monitoring(&self) {
		debug!("requesting UI to stop monitoring");
		self.send(SyncEvent::StopMonitoring);
	}
}

impl EventReceiver {
	/// Wait for the next event. `None` once every sink has been dropped.
	pub async fn recv(&mut self) -> Option<SyncEvent> {
		self.rx.recv().await
	}

	/// Poll without waiting
	pub fn try_recv(&mut self) -> Option<SyncEvent> {
		self.rx.try_recv().ok()
	}

	/// Drain everything currently queued
	pub fn drain(&mut self) -> Vec<SyncEvent> {
		let mut events = Vec::new();
		while let Some(event) = self.try_recv() {
			events.push(event);
		}
		events
	}
}


// vim: ts=4
