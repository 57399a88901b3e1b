//! Coin economy: balance, affordability checks, and change notifications.
//!
//! The balance is mutated only through [`Economy::debit`] and
//! [`Economy::credit`]. Every change publishes a [`CoinsChanged`] message on
//! a multi-subscriber channel, so the economy has no knowledge of its
//! observers; a UI surface subscribes and renders, the core never formats
//! currency text.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Notification published whenever the coin balance changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinsChanged {
    /// The balance after the change.
    pub balance: u32,
}

/// Player coin balance with a change-notification channel.
///
/// Subscribers call [`Economy::subscribe`] and receive every subsequent
/// [`CoinsChanged`] message; unsubscribing is dropping the receiver, after
/// which the dead sender is pruned on the next publish. Subscriptions are
/// transient and excluded from serialized snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    /// Current coin balance.
    coins: u32,
    /// Live notification senders, one per subscriber.
    #[serde(skip)]
    subscribers: Vec<Sender<CoinsChanged>>,
}

impl Economy {
    /// Create an economy with the given starting balance.
    #[must_use]
    pub fn new(coins: u32) -> Self {
        Self {
            coins,
            subscribers: Vec::new(),
        }
    }

    /// Current coin balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.coins
    }

    /// Check whether the balance covers a price.
    #[must_use]
    pub const fn can_afford(&self, price: u32) -> bool {
        self.coins >= price
    }

    /// Remove `price` coins from the balance and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientFunds`] when `price` exceeds the
    /// balance; the balance is unchanged and nothing is published.
    pub fn debit(&mut self, price: u32) -> Result<()> {
        if price > self.coins {
            return Err(GameError::InsufficientFunds {
                required: price,
                available: self.coins,
            });
        }
        self.coins -= price;
        self.publish();
        Ok(())
    }

    /// Add coins to the balance (external income) and notify subscribers.
    ///
    /// Saturates at `u32::MAX`.
    pub fn credit(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
        self.publish();
    }

    /// Subscribe to balance changes.
    ///
    /// The receiver sees every change published after this call. Drop it to
    /// unsubscribe.
    pub fn subscribe(&mut self) -> Receiver<CoinsChanged> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Re-announce the current balance to all subscribers.
    ///
    /// Used at session start so freshly attached observers render the
    /// initial balance without waiting for the first transaction.
    pub fn announce(&mut self) {
        self.publish();
    }

    fn publish(&mut self) {
        let event = CoinsChanged {
            balance: self.coins,
        };
        self.subscribers.retain(|tx| tx.send(event).is_ok());
        tracing::debug!(balance = self.coins, "coins changed");
    }
}
