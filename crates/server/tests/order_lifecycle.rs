//! Order lifecycle integration tests.
//!
//! Exercise checkout, cancellation, status advancement, and reorder against
//! an in-memory database, verifying the status state machine and the
//! entitlement checks end to end.

mod common;

use oakline_core::{
    CandidateCart, CandidateLine, Identity, Money, OrderStatus, PaymentMethod, PaymentStatus,
    ProductId,
};
use oakline_server::db::{OrderRepository, RepositoryError};
use oakline_server::error::AppError;
use oakline_server::services::OrderService;

use common::{insert_customer, insert_product, set_product_price, test_pool};

fn cart(lines: &[(ProductId, u32)]) -> CandidateCart {
    CandidateCart::new(
        lines
            .iter()
            .map(|&(product_id, quantity)| CandidateLine {
                product_id,
                quantity,
                selected: true,
            })
            .collect(),
    )
}

fn card() -> PaymentMethod {
    PaymentMethod::new("Credit Card")
}

fn cod() -> PaymentMethod {
    PaymentMethod::new("Cash on Delivery")
}

/// Advance an order along the given forward edges as an admin.
async fn advance_through(
    pool: &sqlx::SqlitePool,
    admin: Identity,
    order_id: oakline_core::OrderId,
    statuses: &[OrderStatus],
) {
    let service = OrderService::new(pool);
    for &status in statuses {
        service
            .advance_status(admin, order_id, status)
            .await
            .expect("Failed to advance order status");
    }
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_writes_header_lines_and_payment() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;
    let stand = insert_product(&pool, "Fern Stand", 4_950, 9).await;

    let receipt = OrderService::new(&pool)
        .checkout(
            Identity::customer(customer),
            &cart(&[(desk, 2), (stand, 1)]),
            card(),
        )
        .await
        .expect("Failed to check out");

    // 2 x $249.00 + 1 x $49.50
    assert_eq!(receipt.total, Money::from_cents(54_750));
    assert!(receipt.dropped_product_ids.is_empty());
    assert_eq!(receipt.reference.len(), 6);

    let repo = OrderRepository::new(&pool);
    let order = repo
        .get_header(receipt.order_id)
        .await
        .expect("Failed to read order")
        .expect("Order not found");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_id, customer);
    assert_eq!(order.version, 0);

    let lines = repo
        .lines_for_order(receipt.order_id)
        .await
        .expect("Failed to read lines");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].product_id, desk);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[0].unit_price, Money::from_cents(24_900));

    let payment = repo
        .get_payment(receipt.order_id)
        .await
        .expect("Failed to read payment")
        .expect("Payment not found");
    assert_eq!(payment.total_amount, receipt.total);
    assert_eq!(payment.status, PaymentStatus::Paid);
    assert_eq!(payment.method.as_str(), "Credit Card");
}

#[tokio::test]
async fn test_cash_on_delivery_starts_unpaid() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let receipt = OrderService::new(&pool)
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), cod())
        .await
        .expect("Failed to check out");

    let payment = OrderRepository::new(&pool)
        .get_payment(receipt.order_id)
        .await
        .expect("Failed to read payment")
        .expect("Payment not found");
    assert_eq!(payment.status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_checkout_drops_vanished_products() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;
    let ghost = ProductId::new(9_999);

    let receipt = OrderService::new(&pool)
        .checkout(
            Identity::customer(customer),
            &cart(&[(desk, 1), (ghost, 3)]),
            card(),
        )
        .await
        .expect("Failed to check out");

    assert_eq!(receipt.dropped_product_ids, vec![ghost]);
    assert_eq!(receipt.total, Money::from_cents(24_900));

    let lines = OrderRepository::new(&pool)
        .lines_for_order(receipt.order_id)
        .await
        .expect("Failed to read lines");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, desk);
}

#[tokio::test]
async fn test_checkout_empty_cart_rejected() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;

    let result = OrderService::new(&pool)
        .checkout(Identity::customer(customer), &cart(&[]), card())
        .await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_zero_quantity_line_rejected() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;
    let stand = insert_product(&pool, "Fern Stand", 4_950, 9).await;

    let service = OrderService::new(&pool);

    // One bad line poisons the whole checkout, valid siblings or not.
    let result = service
        .checkout(
            Identity::customer(customer),
            &cart(&[(desk, 1), (stand, 0)]),
            card(),
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));

    let result = service
        .quick_order(Identity::customer(customer), desk, 0, card())
        .await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_checkout_skips_unselected_lines() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;
    let stand = insert_product(&pool, "Fern Stand", 4_950, 9).await;

    let candidate = CandidateCart::new(vec![
        CandidateLine {
            product_id: desk,
            quantity: 1,
            selected: true,
        },
        CandidateLine {
            product_id: stand,
            quantity: 4,
            selected: false,
        },
    ]);

    let receipt = OrderService::new(&pool)
        .checkout(Identity::customer(customer), &candidate, card())
        .await
        .expect("Failed to check out");

    assert_eq!(receipt.total, Money::from_cents(24_900));
    let lines = OrderRepository::new(&pool)
        .lines_for_order(receipt.order_id)
        .await
        .expect("Failed to read lines");
    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn test_quick_order_unknown_product() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;

    let result = OrderService::new(&pool)
        .quick_order(
            Identity::customer(customer),
            ProductId::new(404),
            1,
            card(),
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_owner_cancels_pending_order() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    let cancelled = service
        .cancel(Identity::customer(customer), receipt.order_id)
        .await
        .expect("Failed to cancel order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.version, 1);
}

#[tokio::test]
async fn test_admin_cancels_someone_elses_order() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let admin = insert_customer(&pool, "Root", "root@example.com", "admin").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    let cancelled = service
        .cancel(Identity::admin(admin), receipt.order_id)
        .await
        .expect("Failed to cancel order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_by_other_customer_forbidden() {
    let pool = test_pool().await;
    let owner = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let stranger = insert_customer(&pool, "Eve", "eve@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(owner), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    let result = service
        .cancel(Identity::customer(stranger), receipt.order_id)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    // The order is untouched.
    let order = OrderRepository::new(&pool)
        .get_header(receipt.order_id)
        .await
        .expect("Failed to read order")
        .expect("Order not found");
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_cancel_past_to_ship_rejected() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let admin = insert_customer(&pool, "Root", "root@example.com", "admin").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    advance_through(
        &pool,
        Identity::admin(admin),
        receipt.order_id,
        &[OrderStatus::ToShip, OrderStatus::ToReceive],
    )
    .await;

    let result = service
        .cancel(Identity::customer(customer), receipt.order_id)
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));

    // The failed cancellation left the status alone.
    let order = OrderRepository::new(&pool)
        .get_header(receipt.order_id)
        .await
        .expect("Failed to read order")
        .expect("Order not found");
    assert_eq!(order.status, OrderStatus::ToReceive);
}

// ============================================================================
// Status advancement
// ============================================================================

#[tokio::test]
async fn test_full_forward_walk() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let admin = insert_customer(&pool, "Root", "root@example.com", "admin").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    advance_through(
        &pool,
        Identity::admin(admin),
        receipt.order_id,
        &[
            OrderStatus::ToShip,
            OrderStatus::ToReceive,
            OrderStatus::Completed,
        ],
    )
    .await;

    let order = OrderRepository::new(&pool)
        .get_header(receipt.order_id)
        .await
        .expect("Failed to read order")
        .expect("Order not found");
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.version, 3);
}

#[tokio::test]
async fn test_advance_requires_admin() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    let result = service
        .advance_status(
            Identity::customer(customer),
            receipt.order_id,
            OrderStatus::ToShip,
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_advance_cannot_skip_states() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let admin = insert_customer(&pool, "Root", "root@example.com", "admin").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    for target in [
        OrderStatus::ToReceive,
        OrderStatus::Completed,
        OrderStatus::Pending,
        // Cancellation goes through the cancel operation, never advance.
        OrderStatus::Cancelled,
    ] {
        let result = service
            .advance_status(Identity::admin(admin), receipt.order_id, target)
            .await;
        assert!(
            matches!(result, Err(AppError::InvalidTransition(_))),
            "Pending -> {target} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_stale_version_conflicts() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let admin = insert_customer(&pool, "Root", "root@example.com", "admin").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    // An admin advance lands first and bumps the version.
    service
        .advance_status(Identity::admin(admin), receipt.order_id, OrderStatus::ToShip)
        .await
        .expect("Failed to advance order status");

    // A cancellation that had read version 0 loses the race.
    let result = OrderRepository::new(&pool)
        .update_status(receipt.order_id, 0, OrderStatus::Cancelled)
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    let order = OrderRepository::new(&pool)
        .get_header(receipt.order_id)
        .await
        .expect("Failed to read order")
        .expect("Order not found");
    assert_eq!(order.status, OrderStatus::ToShip);
    assert_eq!(order.version, 1);
}

// ============================================================================
// Reorder
// ============================================================================

#[tokio::test]
async fn test_reorder_copies_lines_at_historical_prices() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;
    let stand = insert_product(&pool, "Fern Stand", 4_950, 9).await;

    let service = OrderService::new(&pool);
    let original = service
        .checkout(
            Identity::customer(customer),
            &cart(&[(desk, 2), (stand, 1)]),
            card(),
        )
        .await
        .expect("Failed to check out");

    // The catalog moves on; the copy must not notice.
    set_product_price(&pool, desk, 99_900).await;

    let copy = service
        .reorder(Identity::customer(customer), original.order_id)
        .await
        .expect("Failed to reorder");

    assert_ne!(copy.order_id, original.order_id);
    assert_eq!(copy.total, original.total);

    let repo = OrderRepository::new(&pool);
    let original_lines = repo
        .lines_for_order(original.order_id)
        .await
        .expect("Failed to read lines");
    let copied_lines = repo
        .lines_for_order(copy.order_id)
        .await
        .expect("Failed to read lines");
    assert_eq!(copied_lines.len(), original_lines.len());
    for (copied, original) in copied_lines.iter().zip(&original_lines) {
        assert_eq!(copied.product_id, original.product_id);
        assert_eq!(copied.quantity, original.quantity);
        assert_eq!(copied.unit_price, original.unit_price);
    }

    // Fresh order, payment pending selection.
    let order = repo
        .get_header(copy.order_id)
        .await
        .expect("Failed to read order")
        .expect("Order not found");
    assert_eq!(order.status, OrderStatus::Pending);

    let payment = repo
        .get_payment(copy.order_id)
        .await
        .expect("Failed to read payment")
        .expect("Payment not found");
    assert_eq!(payment.method.as_str(), "Pending");
    assert_eq!(payment.status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_reorder_is_owner_only() {
    let pool = test_pool().await;
    let owner = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let admin = insert_customer(&pool, "Root", "root@example.com", "admin").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    let receipt = service
        .checkout(Identity::customer(owner), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    // Reordering places a new order on the caller's account, so even an
    // admin may not do it on someone else's behalf.
    let result = service.reorder(Identity::admin(admin), receipt.order_id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_list_mine_newest_first() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let other = insert_customer(&pool, "Eve", "eve@example.com", "customer").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;
    let stand = insert_product(&pool, "Fern Stand", 4_950, 9).await;

    let service = OrderService::new(&pool);
    let first = service
        .checkout(Identity::customer(customer), &cart(&[(desk, 2)]), card())
        .await
        .expect("Failed to check out");
    let second = service
        .checkout(
            Identity::customer(customer),
            &cart(&[(desk, 1), (stand, 1)]),
            cod(),
        )
        .await
        .expect("Failed to check out");
    service
        .checkout(Identity::customer(other), &cart(&[(stand, 1)]), card())
        .await
        .expect("Failed to check out");

    let summaries = service
        .list_mine(Identity::customer(customer))
        .await
        .expect("Failed to list orders");

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, second.order_id);
    assert_eq!(summaries[1].id, first.order_id);
    assert_eq!(summaries[0].lines.len(), 2);
    assert_eq!(summaries[0].products_string(), "1x Oak Desk, 1x Fern Stand");
    assert!(summaries[0].customer_name.is_none());
}

#[tokio::test]
async fn test_list_all_is_admin_only() {
    let pool = test_pool().await;
    let customer = insert_customer(&pool, "Ada", "ada@example.com", "customer").await;
    let admin = insert_customer(&pool, "Root", "root@example.com", "admin").await;
    let desk = insert_product(&pool, "Oak Desk", 24_900, 5).await;

    let service = OrderService::new(&pool);
    service
        .checkout(Identity::customer(customer), &cart(&[(desk, 1)]), card())
        .await
        .expect("Failed to check out");

    let result = service.list_all(Identity::customer(customer)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let summaries = service
        .list_all(Identity::admin(admin))
        .await
        .expect("Failed to list orders");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].customer_name.as_deref(), Some("Ada"));
}
