//! Aggregate reads for the dashboard

use sqlx::Sqlite;

use super::RepoResult;

/// Slice of a non-deleted payment used by the dashboard figures
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct PaymentFact {
    pub client_id: i64,
    pub amount: f64,
    pub payment_date: i64,
    pub next_payment_date: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct EntityCounts {
    pub clients: i64,
    pub coaches: i64,
    pub active_promotions: i64,
}

pub async fn entity_counts(exec: impl sqlx::Executor<'_, Database = Sqlite>) -> RepoResult<EntityCounts> {
    let counts = sqlx::query_as::<_, EntityCounts>(
        "SELECT \
           (SELECT COUNT(*) FROM client WHERE deleted_at IS NULL) AS clients, \
           (SELECT COUNT(*) FROM coach WHERE deleted_at IS NULL) AS coaches, \
           (SELECT COUNT(*) FROM promotion WHERE active = 1) AS active_promotions",
    )
    .fetch_one(exec)
    .await?;
    Ok(counts)
}

/// Non-deleted payments of non-deleted clients
pub async fn payment_facts(exec: impl sqlx::Executor<'_, Database = Sqlite>) -> RepoResult<Vec<PaymentFact>> {
    let rows = sqlx::query_as::<_, PaymentFact>(
        "SELECT p.client_id, p.amount, p.payment_date, p.next_payment_date \
         FROM payment p JOIN client c ON c.id = p.client_id \
         WHERE p.deleted_at IS NULL AND c.deleted_at IS NULL \
         ORDER BY p.client_id, p.payment_date, p.id",
    )
    .fetch_all(exec)
    .await?;
    Ok(rows)
}
