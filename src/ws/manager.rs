//! Per-game WebSocket subscriber registry with fan-out broadcast.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use super::messages::WsEvent;

/// Sending half of a client's event queue. The socket task owns the receiver.
pub type ClientSender = mpsc::UnboundedSender<WsEvent>;

/// Identifier handed out to each connected client.
pub type ClientId = u64;

/// Tracks which clients watch which game.
#[derive(Debug)]
pub struct WsManager {
    /// game_id → { client_id → sender }
    subs: RwLock<HashMap<String, HashMap<ClientId, ClientSender>>>,
    next_id: AtomicU64,
}

impl WsManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new client watching `game_id`.
    ///
    /// The returned sender lets the socket task reply to this client alone
    /// and attach it to further games.
    pub async fn connect(
        &self,
        game_id: &str,
    ) -> (ClientId, ClientSender, mpsc::UnboundedReceiver<WsEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.attach(game_id, id, tx.clone()).await;
        (id, tx, rx)
    }

    /// Add an existing client's sender to another game's audience.
    pub async fn attach(&self, game_id: &str, client_id: ClientId, tx: ClientSender) {
        let mut subs = self.subs.write().await;
        subs.entry(game_id.to_string())
            .or_default()
            .insert(client_id, tx);
        debug!(game_id, client_id, "WS client subscribed");
    }

    /// Remove a client from a game.
    pub async fn unsubscribe(&self, game_id: &str, client_id: ClientId) {
        let mut subs = self.subs.write().await;
        if let Some(clients) = subs.get_mut(game_id) {
            clients.remove(&client_id);
            if clients.is_empty() {
                subs.remove(game_id);
            }
        }
        debug!(game_id, client_id, "WS client unsubscribed");
    }

    /// Remove a client from every game it watches.
    pub async fn disconnect(&self, client_id: ClientId) {
        let mut subs = self.subs.write().await;
        subs.retain(|_, clients| {
            clients.remove(&client_id);
            !clients.is_empty()
        });
    }

    /// Send an event to all subscribers of a game, pruning closed channels.
    pub async fn broadcast(&self, game_id: &str, event: WsEvent) {
        let subs = self.subs.read().await;
        let Some(clients) = subs.get(game_id) else {
            return;
        };

        let stale: Vec<ClientId> = clients
            .iter()
            .filter(|(_, tx)| tx.send(event.clone()).is_err())
            .map(|(&cid, _)| cid)
            .collect();
        drop(subs); // release read lock before write

        if stale.is_empty() {
            return;
        }
        let mut subs = self.subs.write().await;
        if let Some(clients) = subs.get_mut(game_id) {
            for cid in &stale {
                clients.remove(cid);
                warn!(game_id, client_id = cid, "removed stale WS client");
            }
            if clients.is_empty() {
                subs.remove(game_id);
            }
        }
    }

    /// Send a final event to a game's subscribers and forget the game.
    pub async fn close_game(&self, game_id: &str, event: WsEvent) {
        let clients = self.subs.write().await.remove(game_id);
        let Some(clients) = clients else {
            return;
        };
        for tx in clients.values() {
            let _ = tx.send(event.clone());
        }
        debug!(game_id, clients = clients.len(), "WS game closed");
    }

    pub async fn subscriber_count(&self, game_id: &str) -> usize {
        let subs = self.subs.read().await;
        subs.get(game_id).map_or(0, |c| c.len())
    }

    /// Total number of subscriptions across all games.
    pub async fn total_connections(&self) -> usize {
        let subs = self.subs.read().await;
        subs.values().map(|c| c.len()).sum()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self {
            subs: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
