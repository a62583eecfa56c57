//! Order lifecycle service.
//!
//! Converts carts into persisted orders and moves orders through the status
//! state machine. Every operation takes the verified caller identity
//! explicitly and consults the entitlement policy before touching storage.

use sqlx::SqlitePool;
use tracing::instrument;
use uuid::Uuid;

use oakline_core::{
    CandidateCart, CustomerId, Identity, Money, OrderId, OrderStatus, PaymentMethod, ProductId,
    Reconciliation, TransitionError, ValidatedLine, cart, policy,
};

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{Order, OrderSummary};

/// What checkout-shaped operations hand back to the caller.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub reference: String,
    pub total: Money,
    /// Products the catalog no longer knows; reported as data, not an error.
    pub dropped_product_ids: Vec<ProductId>,
}

/// Service for order lifecycle operations.
pub struct OrderService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Reconcile a client-held cart against a catalog snapshot.
    ///
    /// Run whenever the client cart is loaded; the caller persists the
    /// narrowed cart back to client storage and surfaces the drops.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the snapshot read fails.
    pub async fn reconcile_cart(&self, cart: &CandidateCart) -> Result<Reconciliation> {
        let snapshot = ProductRepository::new(self.pool).price_snapshot().await?;
        Ok(cart::reconcile(cart, &snapshot))
    }

    /// Check out a cart: reconcile, validate, and atomically create the
    /// order header, lines, and payment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if no selected line survives
    /// reconciliation or a quantity is zero.
    #[instrument(skip(self, cart), fields(customer = %identity.id))]
    pub async fn checkout(
        &self,
        identity: Identity,
        cart: &CandidateCart,
        method: PaymentMethod,
    ) -> Result<CheckoutReceipt> {
        let reconciliation = self.reconcile_cart(cart).await?;
        let lines = reconciliation.selected_lines();

        let receipt = self
            .create_order(identity.id, &lines, &method, reconciliation.dropped_product_ids)
            .await?;

        tracing::info!(
            order = %receipt.order_id,
            total = %receipt.total,
            dropped = receipt.dropped_product_ids.len(),
            "checkout complete"
        );
        Ok(receipt)
    }

    /// Place a single-product order ("order now" button).
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(customer = %identity.id))]
    pub async fn quick_order(
        &self,
        identity: Identity,
        product_id: ProductId,
        quantity: u32,
        method: PaymentMethod,
    ) -> Result<CheckoutReceipt> {
        let reconciliation = self
            .reconcile_cart(&CandidateCart::single(product_id, quantity))
            .await?;

        // A single-line cart dropping its line means the product is gone.
        if reconciliation.has_drops() {
            return Err(AppError::NotFound(format!("product {product_id}")));
        }

        self.create_order(identity.id, &reconciliation.lines, &method, Vec::new())
            .await
    }

    /// Cancel an order. Owner or admin; only from `Pending` or `ToShip`.
    ///
    /// # Errors
    ///
    /// `Forbidden` for a non-owner non-admin, `InvalidTransition` if the
    /// order is past cancellation, `Conflict` if a concurrent mutation won.
    #[instrument(skip(self), fields(caller = %identity.id))]
    pub async fn cancel(&self, identity: Identity, order_id: OrderId) -> Result<Order> {
        let repo = OrderRepository::new(self.pool);
        let (order, facts) = repo
            .get_with_facts(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

        if !policy::owns_or_admin(identity, &facts) {
            return Err(AppError::Forbidden(
                "you are not authorized to cancel this order".to_owned(),
            ));
        }
        if !order.status.is_cancellable() {
            return Err(AppError::InvalidTransition(format!(
                "cannot cancel an order with status {}",
                order.status
            )));
        }

        let updated = repo
            .update_status(order_id, order.version, OrderStatus::Cancelled)
            .await?;
        tracing::info!(order = %order_id, "order cancelled");
        Ok(updated)
    }

    /// Advance an order along a forward edge of the status graph. Admin only.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-admins, `InvalidTransition` off the graph,
    /// `Conflict` if a concurrent mutation won.
    #[instrument(skip(self), fields(caller = %identity.id))]
    pub async fn advance_status(
        &self,
        identity: Identity,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order> {
        if !identity.role.is_admin() {
            return Err(AppError::Forbidden(
                "only admins may change order status".to_owned(),
            ));
        }

        let repo = OrderRepository::new(self.pool);
        let order = repo
            .get_header(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

        if !order.status.is_forward_edge_to(target) {
            return Err(TransitionError {
                from: order.status,
                to: target,
            }
            .into());
        }

        let updated = repo.update_status(order_id, order.version, target).await?;
        tracing::info!(order = %order_id, status = %target, "order status advanced");
        Ok(updated)
    }

    /// Place the order again: copy its lines verbatim into a fresh `Pending`
    /// order with a fresh `Pending`/`Unpaid` payment. Owner only.
    ///
    /// # Errors
    ///
    /// `Forbidden` if the caller does not own the source order,
    /// `InvalidArgument` if the source has no lines.
    #[instrument(skip(self), fields(caller = %identity.id))]
    pub async fn reorder(&self, identity: Identity, order_id: OrderId) -> Result<CheckoutReceipt> {
        let repo = OrderRepository::new(self.pool);
        let (_, facts) = repo
            .get_with_facts(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

        if !policy::can_reorder(identity, &facts) {
            return Err(AppError::Forbidden(
                "you are not authorized to reorder this order".to_owned(),
            ));
        }
        if facts.product_ids.is_empty() {
            return Err(AppError::InvalidArgument(
                "original order has no items to reorder".to_owned(),
            ));
        }

        let reference = new_reference();
        let order = repo.create_from(order_id, identity.id, &reference).await?;
        let total = repo
            .get_payment(order.id)
            .await?
            .map(|p| p.total_amount)
            .unwrap_or(Money::ZERO);

        tracing::info!(source = %order_id, order = %order.id, "order placed again");
        Ok(CheckoutReceipt {
            order_id: order.id,
            reference,
            total,
            dropped_product_ids: Vec::new(),
        })
    }

    /// Orders owned by the caller, newest first, with line summaries.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the query fails.
    pub async fn list_mine(&self, identity: Identity) -> Result<Vec<OrderSummary>> {
        Ok(OrderRepository::new(self.pool)
            .list_for_customer(identity.id)
            .await?)
    }

    /// Every order in the store with customer and payment summaries. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for non-admins.
    pub async fn list_all(&self, identity: Identity) -> Result<Vec<OrderSummary>> {
        if !policy::can_view_all_orders(identity) {
            return Err(AppError::Forbidden(
                "only admins may list all orders".to_owned(),
            ));
        }
        Ok(OrderRepository::new(self.pool).list_all().await?)
    }

    /// Shared creation path for checkout and quick order: validate the
    /// reconciled lines, compute the total, and write the three records.
    async fn create_order(
        &self,
        customer_id: CustomerId,
        lines: &[ValidatedLine],
        method: &PaymentMethod,
        dropped_product_ids: Vec<ProductId>,
    ) -> Result<CheckoutReceipt> {
        if lines.is_empty() {
            return Err(AppError::InvalidArgument(
                "no valid items selected for checkout".to_owned(),
            ));
        }
        if lines.iter().any(|line| line.quantity() == 0) {
            return Err(AppError::InvalidArgument(
                "line quantity must be at least 1".to_owned(),
            ));
        }

        let total = order_total(lines)?;
        let reference = new_reference();

        let order = OrderRepository::new(self.pool)
            .create(
                customer_id,
                &reference,
                lines,
                method,
                method.initial_payment_status(),
                total,
            )
            .await?;

        Ok(CheckoutReceipt {
            order_id: order.id,
            reference,
            total,
            dropped_product_ids,
        })
    }
}

/// Sum of `quantity x unit_price` over the lines.
fn order_total(lines: &[ValidatedLine]) -> Result<Money> {
    let mut total = Money::ZERO;
    for line in lines {
        let line_total = line
            .unit_price()
            .checked_mul(line.quantity())
            .map_err(|e| AppError::InvalidArgument(e.to_string()))?;
        total = total
            .checked_add(line_total)
            .map_err(|e| AppError::InvalidArgument(e.to_string()))?;
    }
    Ok(total)
}

/// Short human-facing order code, in the style the shop displays.
fn new_reference() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase()
}
