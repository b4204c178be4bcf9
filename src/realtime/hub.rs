//! Fan-out of newly ingested transactions to live subscribers.
//!
//! A single task owns the subscriber set. Registration, removal and broadcasts
//! all travel through one bounded command channel, so the set is never read and
//! written concurrently and every broadcast reaches exactly the subscribers
//! registered when it is processed.

use crate::core::models::transaction::Transaction;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub type SubscriberId = u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("broadcast hub has shut down")]
    Closed,
}

/// A registered listener. Dropping the receiver is enough to be pruned on the
/// next broadcast, but callers should still `unregister` when they leave.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<Arc<Transaction>>,
}

enum HubCommand {
    Register { reply: oneshot::Sender<Subscription> },
    Unregister { id: SubscriberId },
    Broadcast { transaction: Arc<Transaction> },
    SubscriberCount { reply: oneshot::Sender<usize> },
}

/// Cloneable entry point to the hub task.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub async fn register(&self) -> Result<Subscription, HubError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(HubCommand::Register { reply })
            .await
            .map_err(|_| HubError::Closed)?;
        response.await.map_err(|_| HubError::Closed)
    }

    /// Removing an id that is no longer registered is a no-op.
    pub async fn unregister(&self, id: SubscriberId) {
        if self.commands.send(HubCommand::Unregister { id }).await.is_err() {
            debug!(subscriber = id, "hub closed before unregister");
        }
    }

    /// Fire-and-forget: delivery problems are handled inside the hub and never
    /// reported back to the publisher.
    pub async fn publish(&self, transaction: Transaction) {
        let id = transaction.id;
        let command = HubCommand::Broadcast {
            transaction: Arc::new(transaction),
        };
        if self.commands.send(command).await.is_err() {
            warn!(transaction_id = %id, "broadcast hub unavailable, live update dropped");
        }
    }

    pub async fn subscriber_count(&self) -> Result<usize, HubError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(HubCommand::SubscriberCount { reply })
            .await
            .map_err(|_| HubError::Closed)?;
        response.await.map_err(|_| HubError::Closed)
    }
}

pub struct BroadcastHub {
    commands: mpsc::Receiver<HubCommand>,
    subscribers: HashMap<SubscriberId, mpsc::Sender<Arc<Transaction>>>,
    next_id: SubscriberId,
    subscriber_buffer: usize,
}

impl BroadcastHub {
    /// Starts the hub task. `capacity` bounds pending commands and
    /// `subscriber_buffer` bounds each subscriber's outbox. The task ends once
    /// every handle is dropped.
    pub fn spawn(capacity: usize, subscriber_buffer: usize) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let hub = BroadcastHub {
            commands: rx,
            subscribers: HashMap::new(),
            next_id: 1,
            subscriber_buffer: subscriber_buffer.max(1),
        };
        let task = tokio::spawn(hub.run());
        (HubHandle { commands: tx }, task)
    }

    async fn run(mut self) {
        info!("broadcast hub started");
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        info!(subscribers = self.subscribers.len(), "broadcast hub stopped");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { reply } => {
                let id = self.next_id;
                self.next_id += 1;
                let (sender, receiver) = mpsc::channel(self.subscriber_buffer);
                // Only keep the subscriber if the registering side is still waiting.
                if reply.send(Subscription { id, receiver }).is_ok() {
                    self.subscribers.insert(id, sender);
                    debug!(subscriber = id, total = self.subscribers.len(), "subscriber registered");
                }
            }
            HubCommand::Unregister { id } => {
                if self.subscribers.remove(&id).is_some() {
                    debug!(subscriber = id, total = self.subscribers.len(), "subscriber unregistered");
                }
            }
            HubCommand::Broadcast { transaction } => {
                let delivered = self.deliver(&transaction);
                debug!(transaction_id = %transaction.id, delivered, "transaction broadcast");
            }
            HubCommand::SubscriberCount { reply } => {
                let _ = reply.send(self.subscribers.len());
            }
        }
    }

    /// Enqueues `transaction` for every subscriber and prunes the ones whose
    /// outbox is closed or full. Returns the number of successful deliveries.
    fn deliver(&mut self, transaction: &Arc<Transaction>) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|id, outbox| match outbox.try_send(Arc::clone(transaction)) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(err) => {
                warn!(subscriber = *id, error = %err, "delivery failed, pruning subscriber");
                false
            }
        });
        delivered
    }
}
