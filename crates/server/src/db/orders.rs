//! Order ledger repository.
//!
//! Owns the three co-located records per order (header, lines, payment).
//! Creation writes all three in one transaction - if any write fails, none
//! are observable. Status mutations go through an optimistic version check
//! keyed by order id, so racing mutations on the same order resolve
//! deterministically: the one that observed the pre-mutation state first
//! wins, the other gets `Conflict`.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use oakline_core::{
    CustomerId, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
    ValidatedLine, policy::OrderFacts,
};

use super::RepositoryError;
use crate::models::{Order, OrderLine, OrderSummary, Payment, SummaryLine};

/// Repository for order ledger operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an order: header, lines, and payment in one transaction.
    ///
    /// The caller has already reconciled the lines against a catalog
    /// snapshot and computed the payment total from them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails; no partial
    /// state is left behind.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        reference: &str,
        lines: &[ValidatedLine],
        method: &PaymentMethod,
        payment_status: PaymentStatus,
        total: Money,
    ) -> Result<Order, RepositoryError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query(
            r"
            INSERT INTO orders (customer_id, reference, status, version, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            ",
        )
        .bind(customer_id)
        .bind(reference)
        .bind(OrderStatus::Pending.to_string())
        .bind(created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for line in lines {
            sqlx::query(
                r"
                INSERT INTO order_lines (order_id, product_id, quantity, unit_price_cents)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(order_id)
            .bind(line.product_id())
            .bind(i64::from(line.quantity()))
            .bind(line.unit_price().cents())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r"
            INSERT INTO payments (order_id, method, total_cents, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(order_id)
        .bind(method.as_str())
        .bind(total.cents())
        .bind(payment_status.to_string())
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(order_id),
            customer_id,
            reference: reference.to_owned(),
            status: OrderStatus::Pending,
            version: 0,
            created_at,
        })
    }

    /// Create a new order by copying every line of `source` verbatim.
    ///
    /// The copy reproduces the historical `(product_id, quantity,
    /// unit_price)` triples - current catalog prices and stock are not
    /// consulted. The fresh payment is `Pending`/`Unpaid`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the source order has no lines.
    pub async fn create_from(
        &self,
        source: OrderId,
        customer_id: CustomerId,
        reference: &str,
    ) -> Result<Order, RepositoryError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let order_id = sqlx::query(
            r"
            INSERT INTO orders (customer_id, reference, status, version, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            ",
        )
        .bind(customer_id)
        .bind(reference)
        .bind(OrderStatus::Pending.to_string())
        .bind(created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let copied = sqlx::query(
            r"
            INSERT INTO order_lines (order_id, product_id, quantity, unit_price_cents)
            SELECT ?1, product_id, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = ?2
            ",
        )
        .bind(order_id)
        .bind(source)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if copied == 0 {
            // Rolls back the header insert on drop.
            return Err(RepositoryError::NotFound(format!(
                "order {source} has no line items"
            )));
        }

        let total: i64 = sqlx::query(
            r"
            SELECT COALESCE(SUM(quantity * unit_price_cents), 0) AS total
            FROM order_lines
            WHERE order_id = ?1
            ",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?
        .try_get("total")?;

        sqlx::query(
            r"
            INSERT INTO payments (order_id, method, total_cents, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(order_id)
        .bind(PaymentMethod::PENDING_LABEL)
        .bind(total)
        .bind(PaymentStatus::Unpaid.to_string())
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(order_id),
            customer_id,
            reference: reference.to_owned(),
            status: OrderStatus::Pending,
            version: 0,
            created_at,
        })
    }

    /// Get an order header by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_header(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, customer_id, reference, status, version, created_at
            FROM orders
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(map_order).transpose()
    }

    /// Get an order header together with the product ids its lines reference,
    /// shaped for the entitlement policy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_facts(
        &self,
        id: OrderId,
    ) -> Result<Option<(Order, OrderFacts)>, RepositoryError> {
        let Some(order) = self.get_header(id).await? else {
            return Ok(None);
        };

        let rows = sqlx::query("SELECT product_id FROM order_lines WHERE order_id = ?1")
            .bind(id)
            .fetch_all(self.pool)
            .await?;

        let mut product_ids = Vec::with_capacity(rows.len());
        for row in rows {
            product_ids.push(row.try_get::<ProductId, _>("product_id")?);
        }

        let facts = OrderFacts {
            customer_id: order.customer_id,
            status: order.status,
            product_ids,
        };
        Ok(Some((order, facts)))
    }

    /// Apply a status mutation guarded by the optimistic version check.
    ///
    /// The caller validates the transition against the state graph first;
    /// this only guards against a concurrent mutation having moved the order
    /// since it was read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the version no longer matches
    /// (the caller should re-read and retry), or `RepositoryError::NotFound`
    /// if the order vanished.
    pub async fn update_status(
        &self,
        id: OrderId,
        expected_version: i64,
        new_status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE orders
            SET status = ?1, version = version + 1
            WHERE id = ?2 AND version = ?3
            ",
        )
        .bind(new_status.to_string())
        .bind(id)
        .bind(expected_version)
        .execute(self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return match self.get_header(id).await? {
                Some(_) => Err(RepositoryError::Conflict(format!(
                    "order {id} was modified concurrently"
                ))),
                None => Err(RepositoryError::NotFound(format!("order {id}"))),
            };
        }

        self.get_header(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("order {id}")))
    }

    /// All orders owned by a customer, shaped for the entitlement policy
    /// (used by the review gate).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn facts_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderFacts>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT o.id, o.status, l.product_id
            FROM orders o
            JOIN order_lines l ON l.order_id = o.id
            WHERE o.customer_id = ?1
            ORDER BY o.id
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        let mut facts: Vec<(OrderId, OrderFacts)> = Vec::new();
        for row in rows {
            let order_id: OrderId = row.try_get("id")?;
            let status = parse_status(&row)?;
            let product_id: ProductId = row.try_get("product_id")?;

            match facts.last_mut() {
                Some((id, fact)) if *id == order_id => fact.product_ids.push(product_id),
                _ => facts.push((
                    order_id,
                    OrderFacts {
                        customer_id,
                        status,
                        product_ids: vec![product_id],
                    },
                )),
            }
        }

        Ok(facts.into_iter().map(|(_, fact)| fact).collect())
    }

    /// The line items of an order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_order(&self, id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, order_id, product_id, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OrderLine {
                    id: row.try_get("id")?,
                    order_id: row.try_get("order_id")?,
                    product_id: row.try_get("product_id")?,
                    quantity: parse_quantity(&row)?,
                    unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
                })
            })
            .collect()
    }

    /// The payment record of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_payment(&self, id: OrderId) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, order_id, method, total_cents, status, created_at
            FROM payments
            WHERE order_id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            let status: String = row.try_get("status")?;
            let status = status.parse::<PaymentStatus>().map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
            })?;
            Ok(Payment {
                id: row.try_get("id")?,
                order_id: row.try_get("order_id")?,
                method: PaymentMethod::new(row.try_get::<String, _>("method")?),
                total_amount: Money::from_cents(row.try_get("total_cents")?),
                status,
                created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            })
        })
        .transpose()
    }

    /// Order summaries for one customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT o.id, o.reference, o.customer_id, o.status, o.created_at,
                   NULL AS customer_name,
                   p.method, p.status AS payment_status, p.total_cents,
                   l.product_id, l.quantity, pr.name AS product_name
            FROM orders o
            JOIN payments p ON p.order_id = o.id
            JOIN order_lines l ON l.order_id = o.id
            LEFT JOIN products pr ON pr.id = l.product_id
            WHERE o.customer_id = ?1
            ORDER BY o.created_at DESC, o.id DESC, l.id ASC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        fold_summaries(rows)
    }

    /// Order summaries across the whole store, newest first, decorated with
    /// the customer's display name. Admin projection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT o.id, o.reference, o.customer_id, o.status, o.created_at,
                   c.name AS customer_name,
                   p.method, p.status AS payment_status, p.total_cents,
                   l.product_id, l.quantity, pr.name AS product_name
            FROM orders o
            JOIN payments p ON p.order_id = o.id
            JOIN order_lines l ON l.order_id = o.id
            LEFT JOIN customers c ON c.id = o.customer_id
            LEFT JOIN products pr ON pr.id = l.product_id
            ORDER BY o.created_at DESC, o.id DESC, l.id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        fold_summaries(rows)
    }
}

fn map_order(row: SqliteRow) -> Result<Order, RepositoryError> {
    let status = parse_status(&row)?;
    Ok(Order {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        reference: row.try_get("reference")?,
        status,
        version: row.try_get("version")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn parse_status(row: &SqliteRow) -> Result<OrderStatus, RepositoryError> {
    let status: String = row.try_get("status")?;
    status.parse::<OrderStatus>().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
    })
}

fn parse_quantity(row: &SqliteRow) -> Result<u32, RepositoryError> {
    let quantity: i64 = row.try_get("quantity")?;
    u32::try_from(quantity).map_err(|_| {
        RepositoryError::DataCorruption(format!("invalid line quantity in database: {quantity}"))
    })
}

/// Fold the joined (order x line) rows into one summary per order, keeping
/// the query's ordering.
fn fold_summaries(rows: Vec<SqliteRow>) -> Result<Vec<OrderSummary>, RepositoryError> {
    let mut summaries: Vec<OrderSummary> = Vec::new();

    for row in rows {
        let order_id: OrderId = row.try_get("id")?;
        let line = SummaryLine {
            product_id: row.try_get("product_id")?,
            name: row
                .try_get::<Option<String>, _>("product_name")?
                .unwrap_or_else(|| "Unknown Product".to_owned()),
            quantity: parse_quantity(&row)?,
        };

        match summaries.last_mut() {
            Some(summary) if summary.id == order_id => summary.lines.push(line),
            _ => {
                let payment_status: String = row.try_get("payment_status")?;
                let payment_status = payment_status.parse::<PaymentStatus>().map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid payment status in database: {e}"
                    ))
                })?;

                summaries.push(OrderSummary {
                    id: order_id,
                    reference: row.try_get("reference")?,
                    customer_id: row.try_get("customer_id")?,
                    customer_name: row.try_get::<Option<String>, _>("customer_name")?,
                    status: parse_status(&row)?,
                    date: row.try_get::<DateTime<Utc>, _>("created_at")?,
                    payment_method: PaymentMethod::new(row.try_get::<String, _>("method")?),
                    payment_status,
                    total: Money::from_cents(row.try_get("total_cents")?),
                    lines: vec![line],
                });
            }
        }
    }

    Ok(summaries)
}
