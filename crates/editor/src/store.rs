//! The state store: the single owner of the current editor state.

use std::fmt;
use std::sync::Arc;

use tracing::trace;
use vellum_primitives::{ApplyError, EditorState, Transaction};


/// Handle returned by [`StateStore::subscribe`].
pub type SubscriberId = u64;

/// What subscribers are told after the state changes.
#[derive(Debug, Clone, Copy)]
pub enum ChangeEvent<'a> {
	/// A transaction was committed.
	Changed {
		state: &'a EditorState,
		transaction: &'a Transaction,
	},
	/// The state was replaced wholesale (document load or reconfiguration).
	Loaded { state: &'a EditorState },
}

impl<'a> ChangeEvent<'a> {
	/// The state after the change.
	pub fn state(&self) -> &'a EditorState {
		match self {
			Self::Changed { state, .. } | Self::Loaded { state } => state,
		}
	}
}

type Subscriber = Box<dyn FnMut(&ChangeEvent<'_>) + Send>;

/// Holds the current [`EditorState`] and notifies subscribers of every change.
///
/// Subscribers run synchronously, in subscription order, after the new state
/// is in place.
pub struct StateStore {
	state: EditorState,
	subscribers: Vec<(SubscriberId, Subscriber)>,
	next_id: SubscriberId,
}

impl StateStore {
	pub fn new(state: EditorState) -> Self {
		Self {
			state,
			subscribers: Vec::new(),
			next_id: 0,
		}
	}

	pub fn state(&self) -> &EditorState {
		&self.state
	}

	/// Commits `tr` and notifies subscribers.
	///
	/// # Errors
	///
	/// Returns the [`ApplyError`] and leaves the state untouched when `tr`
	/// does not apply to the current state.
	pub fn apply(&mut self, tr: &Transaction) -> Result<&EditorState, ApplyError> {
		let next = self.state.apply(tr)?;
		Ok(self.install(tr, next))
	}

	/// Installs `next`, a state already derived from the current one by
	/// applying the parts of `tr` in order, and notifies subscribers with
	/// `tr`.
	///
	/// # Errors
	///
	/// Returns [`ApplyError::Stale`] and leaves the state untouched when `tr`
	/// does not start from the current document or `next` does not hold its
	/// resulting document.
	pub fn commit(&mut self, tr: &Transaction, next: EditorState) -> Result<&EditorState, ApplyError> {
		let current = self.state.doc_arc();
		if !Arc::ptr_eq(tr.before(), current) && **tr.before() != **current {
			return Err(ApplyError::Stale);
		}
		if !Arc::ptr_eq(tr.doc_arc(), next.doc_arc()) && **tr.doc_arc() != *next.doc() {
			return Err(ApplyError::Stale);
		}
		Ok(self.install(tr, next))
	}

	fn install(&mut self, tr: &Transaction, next: EditorState) -> &EditorState {
		trace!(
			steps = tr.steps().len(),
			doc_changed = tr.doc_changed(),
			selection = ?next.selection(),
			"committed transaction"
		);
		self.state = next;
		notify(
			&mut self.subscribers,
			&ChangeEvent::Changed {
				state: &self.state,
				transaction: tr,
			},
		);
		&self.state
	}

	/// Replaces the state outright and notifies subscribers.
	pub fn replace(&mut self, state: EditorState) {
		trace!(size = state.doc().content_size(), "replaced state");
		self.state = state;
		notify(&mut self.subscribers, &ChangeEvent::Loaded { state: &self.state });
	}

	/// Registers `subscriber`, returning a handle for [`StateStore::unsubscribe`].
	pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriberId
	where
		F: FnMut(&ChangeEvent<'_>) + Send + 'static,
	{
		let id = self.next_id;
		self.next_id += 1;
		self.subscribers.push((id, Box::new(subscriber)));
		id
	}

	/// Removes a subscriber. Returns false if `id` was not subscribed.
	pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
		let before = self.subscribers.len();
		self.subscribers.retain(|(sid, _)| *sid != id);
		self.subscribers.len() != before
	}

	pub fn subscriber_count(&self) -> usize {
		self.subscribers.len()
	}
}

fn notify(subscribers: &mut [(SubscriberId, Subscriber)], event: &ChangeEvent<'_>) {
	for (_, subscriber) in subscribers {
		subscriber(event);
	}
}

impl fmt::Debug for StateStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StateStore")
			.field("state", &self.state)
			.field("subscribers", &self.subscribers.len())
			.finish()
	}
}
