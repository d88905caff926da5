//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── SaleReconciler::create() → Sale (figures filled)                │
//! │     └── insert()                                                        │
//! │                                                                         │
//! │  2. EDIT (any number of times)                                          │
//! │     └── get_by_id() → existing                                          │
//! │     └── SaleReconciler::reconcile() → SaleUpdate                        │
//! │     └── apply_update() → single UPDATE of the supplied columns          │
//! │                                                                         │
//! │  3. DELETE                                                              │
//! │     └── delete()                                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits are last-writer-wins: there is no version column.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use margin_core::money::div_round_half_up;
use margin_core::{Patch, Sale, SaleFilter, SaleUpdate, SalesSummary, SortField, SortOrder};

const SALE_COLUMNS: &str = "id, description, amount_received_cents, printing_cost_cents, \
    shipping_cost_cents, platform_id, platform_name, platform_commission_bps, \
    platform_fee_total_cents, net_profit_cents, profit_margin_bps, origin_channel, status, \
    created_at, updated_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

/// Raw aggregate row for [`SaleRepository::summary`].
#[derive(Debug, FromRow)]
struct SummaryRow {
    sale_count: i64,
    total_received_cents: i64,
    total_costs_cents: i64,
    total_net_profit_cents: i64,
    margin_sum_bps: i64,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Inserts a fully computed sale.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, platform_id = %sale.platform_id, "Inserting sale");

        sqlx::query(&format!(
            r#"
            INSERT INTO sales ({SALE_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#
        ))
        .bind(&sale.id)
        .bind(&sale.description)
        .bind(sale.amount_received_cents)
        .bind(sale.printing_cost_cents)
        .bind(sale.shipping_cost_cents)
        .bind(&sale.platform_id)
        .bind(&sale.platform_name)
        .bind(sale.platform_commission_bps)
        .bind(sale.platform_fee_total_cents)
        .bind(sale.net_profit_cents)
        .bind(sale.profit_margin_bps)
        .bind(&sale.origin_channel)
        .bind(sale.status)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %sale.id,
            net_profit = %sale.net_profit(),
            margin = %sale.profit_margin(),
            "Sale created"
        );
        Ok(())
    }

    /// Lists sales matching `filter`, in the requested order.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {SALE_COLUMNS} FROM sales WHERE 1 = 1"));
        push_filters(&mut query, filter);

        let direction = match filter.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        query.push(format!(
            " ORDER BY {} {direction}, id {direction}",
            sort_column(filter.sort_by)
        ));

        let sales = query.build_query_as::<Sale>().fetch_all(&self.pool).await?;

        debug!(count = sales.len(), ?filter, "Listed sales");
        Ok(sales)
    }

    /// Totals over the sales matching `filter`.
    ///
    /// Sort options in the filter are ignored.
    pub async fn summary(&self, filter: &SaleFilter) -> DbResult<SalesSummary> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                COUNT(*) AS sale_count,
                COALESCE(SUM(amount_received_cents), 0) AS total_received_cents,
                COALESCE(SUM(printing_cost_cents + shipping_cost_cents + platform_fee_total_cents), 0)
                    AS total_costs_cents,
                COALESCE(SUM(net_profit_cents), 0) AS total_net_profit_cents,
                COALESCE(SUM(profit_margin_bps), 0) AS margin_sum_bps
            FROM sales
            WHERE 1 = 1
            "#,
        );
        push_filters(&mut query, filter);

        let row = query
            .build_query_as::<SummaryRow>()
            .fetch_one(&self.pool)
            .await?;

        let average_margin_bps = if row.sale_count == 0 {
            0
        } else {
            div_round_half_up(row.margin_sum_bps as i128, row.sale_count as i128) as i64
        };

        Ok(SalesSummary {
            sale_count: row.sale_count,
            total_received_cents: row.total_received_cents,
            total_costs_cents: row.total_costs_cents,
            total_net_profit_cents: row.total_net_profit_cents,
            average_margin_bps,
        })
    }

    /// Writes a reconciled update as one `UPDATE` of the supplied columns.
    ///
    /// `updated_at` is always set to `now`.
    ///
    /// ## Errors
    /// `DbError::NotFound` when the sale no longer exists.
    pub async fn apply_update(
        &self,
        id: &str,
        update: &SaleUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<Sale> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE sales SET updated_at = ");
        query.push_bind(now);

        if let Patch::Set(description) = &update.description {
            query.push(", description = ").push_bind(description.clone());
        }
        if let Patch::Set(amount) = update.amount_received_cents {
            query.push(", amount_received_cents = ").push_bind(amount);
        }
        if let Patch::Set(printing) = update.printing_cost_cents {
            query.push(", printing_cost_cents = ").push_bind(printing);
        }
        if let Patch::Set(shipping) = update.shipping_cost_cents {
            query.push(", shipping_cost_cents = ").push_bind(shipping);
        }
        if let Patch::Set(platform_id) = &update.platform_id {
            query.push(", platform_id = ").push_bind(platform_id.clone());
        }
        if let Patch::Set(platform_name) = &update.platform_name {
            query.push(", platform_name = ").push_bind(platform_name.clone());
        }
        if let Patch::Set(commission) = update.platform_commission_bps {
            query.push(", platform_commission_bps = ").push_bind(commission);
        }
        if let Patch::Set(origin) = &update.origin_channel {
            query.push(", origin_channel = ").push_bind(origin.clone());
        }
        if let Patch::Set(status) = update.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(figures) = update.recalculated {
            query
                .push(", platform_fee_total_cents = ")
                .push_bind(figures.platform_fee_total.cents())
                .push(", net_profit_cents = ")
                .push_bind(figures.net_profit.cents())
                .push(", profit_margin_bps = ")
                .push_bind(figures.profit_margin.bps());
        }

        query.push(" WHERE id = ").push_bind(id.to_string());
        query.push(format!(" RETURNING {SALE_COLUMNS}"));

        let sale = query
            .build_query_as::<Sale>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        info!(
            id = %sale.id,
            recalculated = update.recalculated.is_some(),
            net_profit = %sale.net_profit(),
            "Sale updated"
        );
        Ok(sale)
    }

    /// Deletes a sale.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no sale has this id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        info!(id = %id, "Sale deleted");
        Ok(())
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Query Helpers
// =============================================================================

/// Appends `AND ...` clauses for every active filter.
fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }

    if let Some(origin) = non_blank(&filter.origin_channel) {
        query
            .push(" AND LOWER(origin_channel) LIKE ")
            .push_bind(format!("%{}%", escape_like(&origin.to_lowercase())))
            .push(" ESCAPE '\\'");
    }

    if let Some(platform_id) = non_blank(&filter.platform_id) {
        query.push(" AND platform_id = ").push_bind(platform_id.to_string());
    }

    if let Some(from) = filter.from {
        query.push(" AND created_at >= ").push_bind(start_of_day(from));
    }

    // Whole `to` day included: strictly before the next midnight.
    if let Some(next_day) = filter.to.and_then(|to| to.succ_opt()) {
        query.push(" AND created_at < ").push_bind(start_of_day(next_day));
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::AmountReceived => "amount_received_cents",
        SortField::NetProfit => "net_profit_cents",
        SortField::ProfitMargin => "profit_margin_bps",
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

// =============================================================================
// Unit Tests
// =============================================================================
