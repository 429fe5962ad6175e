//! Cart consistency engine
//!
//! Keeps the locally displayed cart in step with the backend. Each line
//! remembers the last message that rendered its controls; an edit coming from
//! any other message is refused before the backend is touched.

use crate::backend::{ApiError, Order, ShopApi};
use crate::session::{ArtifactId, CartLine, ProductId, SessionKey, SessionStore};
use std::sync::Arc;
use thiserror::Error;

/// One cart control actuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEdit {
    Increase,
    Decrease,
    Remove,
}

impl CartEdit {
    pub fn delta(self) -> i64 {
        match self {
            Self::Increase => 1,
            Self::Decrease => -1,
            Self::Remove => 0,
        }
    }

    pub fn removal_requested(self) -> bool {
        matches!(self, Self::Decrease | Self::Remove)
    }

    pub fn explicit_delete(self) -> bool {
        matches!(self, Self::Remove)
    }
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Edit against an outdated view of product {product_id}")]
    Stale { product_id: ProductId },
    #[error(transparent)]
    Backend(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderCompletion {
    /// Nothing to order; no backend call was made
    EmptyCart,
    Completed {
        order: Order,
        /// Lines whose controls must be re-rendered at quantity zero
        cleared: Vec<(ProductId, ArtifactId)>,
    },
}

pub struct CartEngine {
    api: ShopApi,
    sessions: Arc<SessionStore>,
}

impl CartEngine {
    pub fn new(api: ShopApi, sessions: Arc<SessionStore>) -> Self {
        Self { api, sessions }
    }

    /// Seed the local cart from the backend the first time a session needs it.
    pub async fn ensure_loaded(&self, session: SessionKey) -> Result<(), ApiError> {
        if self.sessions.cart_loaded(session).await {
            return Ok(());
        }
        let items = self.api.cart(session, false).await?;
        let seeded = self
            .sessions
            .seed_cart(session, items.into_iter().map(|item| (item.product_id, item.quantity)))
            .await;
        if seeded {
            tracing::debug!(%session, "Cart loaded");
        }
        Ok(())
    }

    pub async fn quantity(&self, session: SessionKey, product_id: ProductId) -> u32 {
        self.sessions
            .cart_line(session, product_id)
            .await
            .map_or(0, |line| line.quantity)
    }

    /// Apply an edit that originated from the controls on `artifact`.
    pub async fn apply(
        &self,
        session: SessionKey,
        product_id: ProductId,
        edit: CartEdit,
        artifact: ArtifactId,
    ) -> Result<CartLine, CartError> {
        let existing = self.sessions.cart_line(session, product_id).await;
        if let Some(line) = existing {
            if line.artifact != Some(artifact) {
                tracing::info!(%session, product_id, %artifact, "Rejected stale cart edit");
                return Err(CartError::Stale { product_id });
            }
        }

        let current = i64::from(existing.map_or(0, |line| line.quantity));
        let resulting = current + edit.delta();
        let whole_line = edit.explicit_delete() || resulting <= 0;

        if edit.removal_requested() {
            self.api.remove_from_cart(session, product_id, whole_line).await?;
        } else {
            self.api.add_to_cart(session, product_id, 1).await?;
        }

        let quantity = if whole_line {
            0
        } else {
            u32::try_from(resulting).unwrap_or(u32::MAX)
        };
        let line = self
            .sessions
            .update_line(session, product_id, |line| {
                line.quantity = quantity;
                line.artifact.get_or_insert(artifact);
            })
            .await;
        tracing::info!(%session, product_id, ?edit, quantity, "Cart updated");
        Ok(line)
    }

    /// Bind a line to the message that now displays its controls.
    pub async fn record_artifact(&self, session: SessionKey, product_id: ProductId, artifact: ArtifactId) {
        self.sessions
            .update_line(session, product_id, |line| line.artifact = Some(artifact))
            .await;
    }

    /// Finalize the order and drop the session's local cart.
    pub async fn complete_order(&self, session: SessionKey) -> Result<OrderCompletion, ApiError> {
        let lines = self.sessions.cart_lines(session).await;
        if !lines.iter().any(|(_, line)| line.quantity > 0) {
            return Ok(OrderCompletion::EmptyCart);
        }

        let order = self.api.complete_order(session).await?;

        let mut cleared: Vec<_> = self
            .sessions
            .take_cart(session)
            .await
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(product_id, line)| line.artifact.map(|artifact| (product_id, artifact)))
            .collect();
        cleared.sort_unstable();
        tracing::info!(%session, order_id = order.id, cleared = cleared.len(), "Order completed");
        Ok(OrderCompletion::Completed { order, cleared })
    }
}
