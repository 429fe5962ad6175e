//! Session store
//!
//! Process-wide, in-memory state keyed by session: the bearer token, the
//! workflow position and the locally cached cart lines. All three maps sit
//! behind one reader/writer lock; the lock is held for the map access only,
//! never across a network call.

use crate::workflow::WorkflowState;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::RwLock;

/// Stable identifier of one end user's conversation (the chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(pub i64);

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a previously sent interactive message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(pub i64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type ProductId = u64;

/// Locally cached cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartLine {
    pub quantity: u32,
    /// Last message that rendered this line; `None` until the first render
    pub artifact: Option<ArtifactId>,
}

/// Snapshot of one session, read once per inbound event
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub key: SessionKey,
    pub token: Option<String>,
    pub workflow: WorkflowState,
}

impl SessionContext {
    pub fn is_editing(&self) -> bool {
        matches!(self.workflow, WorkflowState::EditingField { .. })
    }
}

#[derive(Debug, Default)]
struct Session {
    workflow: WorkflowState,
}

#[derive(Default)]
struct Maps {
    sessions: HashMap<SessionKey, Session>,
    tokens: HashMap<SessionKey, String>,
    carts: HashMap<SessionKey, HashMap<ProductId, CartLine>>,
    /// Sessions whose cart was seeded from the backend
    loaded: HashSet<SessionKey>,
}

/// Thread-safe keyed store shared by the gateway, the workflow driver and
/// the cart engine.
#[derive(Default)]
pub struct SessionStore {
    maps: RwLock<Maps>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session context, creating the session on first contact.
    pub async fn context(&self, key: SessionKey) -> SessionContext {
        let mut maps = self.maps.write().await;
        let workflow = maps.sessions.entry(key).or_default().workflow.clone();
        SessionContext {
            key,
            token: maps.tokens.get(&key).cloned(),
            workflow,
        }
    }

    // ==================== Tokens ====================

    pub async fn token(&self, key: SessionKey) -> Option<String> {
        self.maps.read().await.tokens.get(&key).cloned()
    }

    pub async fn set_token(&self, key: SessionKey, token: impl Into<String>) {
        self.maps.write().await.tokens.insert(key, token.into());
    }

    /// Store a token issued for a (possibly different) account. The cached
    /// cart belonged to the previous token and is dropped.
    pub async fn replace_token(&self, key: SessionKey, token: impl Into<String>) {
        let mut maps = self.maps.write().await;
        maps.tokens.insert(key, token.into());
        maps.carts.remove(&key);
        maps.loaded.remove(&key);
    }

    // ==================== Workflow ====================

    pub async fn workflow(&self, key: SessionKey) -> WorkflowState {
        self.maps
            .read()
            .await
            .sessions
            .get(&key)
            .map(|s| s.workflow.clone())
            .unwrap_or_default()
    }

    pub async fn set_workflow(&self, key: SessionKey, workflow: WorkflowState) {
        self.maps.write().await.sessions.entry(key).or_default().workflow = workflow;
    }

    /// Drop any in-progress workflow. The token is kept.
    pub async fn reset_workflow(&self, key: SessionKey) {
        self.set_workflow(key, WorkflowState::Idle).await;
    }

    // ==================== Cart lines ====================
    //
    // Only the cart engine mutates these.

    pub(crate) async fn cart_loaded(&self, key: SessionKey) -> bool {
        self.maps.read().await.loaded.contains(&key)
    }

    /// Seed the cart from authoritative quantities. Returns false (and leaves
    /// the map alone) if the session was already seeded. Lines rendered
    /// before the first successful load keep their artifact.
    pub(crate) async fn seed_cart(
        &self,
        key: SessionKey,
        quantities: impl IntoIterator<Item = (ProductId, u32)>,
    ) -> bool {
        let mut maps = self.maps.write().await;
        if !maps.loaded.insert(key) {
            return false;
        }
        let cart = maps.carts.entry(key).or_default();
        for (product_id, quantity) in quantities {
            cart.entry(product_id).or_default().quantity = quantity;
        }
        true
    }

    pub(crate) async fn cart_line(&self, key: SessionKey, product_id: ProductId) -> Option<CartLine> {
        self.maps
            .read()
            .await
            .carts
            .get(&key)
            .and_then(|cart| cart.get(&product_id))
            .copied()
    }

    /// Apply `update` to a line, creating the cart and the line when missing.
    pub(crate) async fn update_line<F>(&self, key: SessionKey, product_id: ProductId, update: F) -> CartLine
    where
        F: FnOnce(&mut CartLine),
    {
        let mut maps = self.maps.write().await;
        let line = maps
            .carts
            .entry(key)
            .or_default()
            .entry(product_id)
            .or_default();
        update(line);
        *line
    }

    pub(crate) async fn cart_lines(&self, key: SessionKey) -> Vec<(ProductId, CartLine)> {
        let maps = self.maps.read().await;
        let mut lines: Vec<_> = maps
            .carts
            .get(&key)
            .map(|cart| cart.iter().map(|(id, line)| (*id, *line)).collect())
            .unwrap_or_default();
        lines.sort_by_key(|(id, _)| *id);
        lines
    }

    /// Remove the session's whole cart map.
    pub(crate) async fn take_cart(&self, key: SessionKey) -> Option<HashMap<ProductId, CartLine>> {
        let mut maps = self.maps.write().await;
        maps.loaded.remove(&key);
        maps.carts.remove(&key)
    }
}
