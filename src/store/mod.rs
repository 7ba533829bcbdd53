//! Owned, shared storefront state.
//!
//! A [`Store`] holds the single mutable [`Dataset`] behind an async read/write lock.
//! Writers are serialized, so related updates made inside one [`Store::write`] call
//! are applied together. Every committed change is announced on a broadcast channel
//! so that views never keep their own copies in sync by hand.

mod dataset;

pub use dataset::Dataset;

use crate::errors::Result;
use crate::models::{AdoptionStatus, OrderStatus, PetStatus, Role};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::trace;

const EVENT_CAPACITY: usize = 64;

/// A committed change to the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StoreEvent {
    PetAdded { pet_id: String },
    PetStatusChanged { pet_id: String, status: PetStatus },
    ProductChanged { product_id: String },
    UserRegistered { user_id: String },
    UserUpdated { user_id: String },
    UserRoleChanged { user_id: String, role: Role },
    OrderCreated { order_id: String },
    OrderStatusChanged { order_id: String, status: OrderStatus },
    AdoptionRequested { request_id: String, pet_id: String },
    AdoptionStatusChanged { request_id: String, status: AdoptionStatus },
    ContactMessageReceived { message_id: String },
    ContactMessageRead { message_id: String },
}

/// Cheaply cloneable handle to the shared dataset.
#[derive(Debug, Clone)]
pub struct Store {
    data: Arc<RwLock<Dataset>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Store {
    /// Wraps an already-built dataset.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            data: Arc::new(RwLock::new(dataset)),
            events,
        }
    }

    /// A store holding the embedded seed data.
    pub fn seeded() -> Result<Self> {
        Ok(Self::new(Dataset::seed()?))
    }

    /// Runs `f` against a shared view of the dataset.
    pub async fn read<R>(&self, f: impl FnOnce(&Dataset) -> R) -> R {
        let guard = self.data.read().await;
        f(&guard)
    }

    /// Runs `f` with exclusive access to the dataset.
    pub async fn write<R>(&self, f: impl FnOnce(&mut Dataset) -> R) -> R {
        let mut guard = self.data.write().await;
        f(&mut guard)
    }

    /// Receives every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: StoreEvent) {
        trace!(?event, "Publishing store event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
