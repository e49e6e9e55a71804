//! Progress event bus for the executor.
//!
//! One bus is constructed per queue/driver and carries the task and
//! queue lifecycle events those components emit. Whoever drives the run
//! (a UI layer, an integration test) subscribes before starting it;
//! anything published earlier is simply gone, since a broadcast channel
//! keeps no history for late subscribers.

use ramp_types::RampEvent;
use tokio::sync::broadcast;

/// Fan-out channel for [`RampEvent`]s.
///
/// Thin wrapper over a tokio broadcast sender. The driver and queue
/// each hold a clone and publish into the same channel, so a single
/// subscription observes the whole run.
pub struct EventBus {
	sender: broadcast::Sender<RampEvent>,
}

impl EventBus {
	/// Creates a bus whose channel buffers up to `capacity` events.
	///
	/// A subscriber that lags more than `capacity` events behind loses
	/// the oldest ones.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Opens a receiver for events published from this point on.
	pub fn subscribe(&self) -> broadcast::Receiver<RampEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to every live subscriber.
	///
	/// Errors only when nobody is subscribed. Progress events are
	/// advisory, so the executor ignores that case.
	pub fn publish(&self, event: RampEvent) -> Result<(), broadcast::error::SendError<RampEvent>> {
		self.sender.send(event)?;
		Ok(())
	}
}

// A clone is another handle onto the same channel, not a new channel.
impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ramp_types::{QueueEvent, TaskDescriptor, TaskEvent, TaskParams};

	fn test_event() -> RampEvent {
		RampEvent::Task(TaskEvent::Started {
			descriptor: TaskDescriptor::new(TaskParams::PayFees { chain_id: 42161 }),
		})
	}

	#[test]
	fn test_subscribe_creates_receiver() {
		let event_bus = EventBus::new(10);

		let _receiver = event_bus.subscribe();

		assert_eq!(event_bus.sender.receiver_count(), 1);
	}

	#[tokio::test]
	async fn test_publish_and_receive_event() {
		let event_bus = EventBus::new(10);
		let mut receiver = event_bus.subscribe();

		event_bus.publish(test_event()).unwrap();

		let received = receiver.recv().await.unwrap();
		assert!(matches!(
			received,
			RampEvent::Task(TaskEvent::Started { .. })
		));
	}

	#[tokio::test]
	async fn test_cloned_bus_publishes_to_all_subscribers() {
		let event_bus1 = EventBus::new(10);
		let event_bus2 = event_bus1.clone();

		let mut receiver1 = event_bus1.subscribe();
		let mut receiver2 = event_bus2.subscribe();

		event_bus2
			.publish(RampEvent::Queue(QueueEvent::Completed { tasks: 3 }))
			.unwrap();

		assert!(matches!(
			receiver1.recv().await.unwrap(),
			RampEvent::Queue(QueueEvent::Completed { tasks: 3 })
		));
		assert!(matches!(
			receiver2.recv().await.unwrap(),
			RampEvent::Queue(QueueEvent::Completed { tasks: 3 })
		));
	}

	#[test]
	fn test_publish_with_no_subscribers_is_an_error() {
		let event_bus = EventBus::new(10);

		let result = event_bus.publish(test_event());
		assert!(result.is_err());
	}
}
