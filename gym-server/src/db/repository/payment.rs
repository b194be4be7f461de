//! Payment Repository

use shared::models::{Payment, PaymentDetail, PaymentPeriod};
use sqlx::Sqlite;

use super::{RepoError, RepoResult};

const PAYMENT_COLUMNS: &str = "id, client_id, promotion_id, amount, period, months, payment_date, next_payment_date, notes, created_at, updated_at, deleted_at";

const DETAIL_SELECT: &str = "SELECT p.id, p.client_id, p.promotion_id, p.amount, p.period, p.months, p.payment_date, p.next_payment_date, p.notes, p.created_at, p.updated_at, p.deleted_at, c.full_name AS client_full_name, pr.name AS promotion_name FROM payment p JOIN client c ON c.id = p.client_id LEFT JOIN promotion pr ON pr.id = p.promotion_id";

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub client_id: i64,
    pub promotion_id: Option<i64>,
    pub amount: f64,
    pub period: PaymentPeriod,
    pub months: Option<i64>,
    pub payment_date: i64,
    pub next_payment_date: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentChanges {
    pub client_id: Option<i64>,
    pub amount: Option<f64>,
    pub period: Option<PaymentPeriod>,
    pub months: Option<i64>,
    pub payment_date: Option<i64>,
    pub next_payment_date: Option<i64>,
    pub notes: Option<String>,
}

/// Most recently recorded payments with client and promotion names
pub async fn find_recent(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    limit: i64,
) -> RepoResult<Vec<PaymentDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE p.deleted_at IS NULL ORDER BY p.created_at DESC, p.id DESC LIMIT ?");
    let rows = sqlx::query_as::<_, PaymentDetail>(&sql)
        .bind(limit)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

pub async fn find_detail(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<PaymentDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE p.id = ? AND p.deleted_at IS NULL");
    let row = sqlx::query_as::<_, PaymentDetail>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

pub async fn find_by_client(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    client_id: i64,
) -> RepoResult<Vec<PaymentDetail>> {
    let sql = format!(
        "{DETAIL_SELECT} WHERE p.client_id = ? AND p.deleted_at IS NULL ORDER BY p.payment_date DESC, p.id DESC"
    );
    let rows = sqlx::query_as::<_, PaymentDetail>(&sql)
        .bind(client_id)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

/// Non-deleted payment by id
pub async fn find_by_id(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Option<Payment>> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment WHERE id = ? AND deleted_at IS NULL");
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

/// Client's non-deleted payments intersecting `[start, end)`
pub async fn find_overlapping(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    client_id: i64,
    start: i64,
    end: i64,
    exclude_id: Option<i64>,
) -> RepoResult<Vec<Payment>> {
    let sql = format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment \
         WHERE client_id = ?1 AND deleted_at IS NULL AND payment_date < ?3 AND ?2 < next_payment_date \
           AND (?4 IS NULL OR id != ?4) \
         ORDER BY payment_date, id"
    );
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(client_id)
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

/// Client's non-deleted payment with the latest start
pub async fn latest_for_client(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    client_id: i64,
) -> RepoResult<Option<Payment>> {
    let sql = format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment WHERE client_id = ? AND deleted_at IS NULL \
         ORDER BY payment_date DESC, id DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(client_id)
        .fetch_optional(exec)
        .await?;
    Ok(row)
}

pub async fn insert(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    data: &NewPayment,
) -> RepoResult<Payment> {
    let sql = format!(
        "INSERT INTO payment (id, client_id, promotion_id, amount, period, months, payment_date, next_payment_date, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10) RETURNING {PAYMENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(shared::util::snowflake_id())
        .bind(data.client_id)
        .bind(data.promotion_id)
        .bind(data.amount)
        .bind(data.period)
        .bind(data.months)
        .bind(data.payment_date)
        .bind(data.next_payment_date)
        .bind(&data.notes)
        .bind(shared::util::now_millis())
        .fetch_one(exec)
        .await?;
    Ok(row)
}

pub async fn update(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
    data: &PaymentChanges,
) -> RepoResult<Payment> {
    let sql = format!(
        "UPDATE payment SET client_id = COALESCE(?1, client_id), amount = COALESCE(?2, amount), period = COALESCE(?3, period), \
         months = COALESCE(?4, months), payment_date = COALESCE(?5, payment_date), \
         next_payment_date = COALESCE(?6, next_payment_date), notes = COALESCE(?7, notes), updated_at = ?8 \
         WHERE id = ?9 AND deleted_at IS NULL RETURNING {PAYMENT_COLUMNS}"
    );
    sqlx::query_as::<_, Payment>(&sql)
        .bind(data.client_id)
        .bind(data.amount)
        .bind(data.period)
        .bind(data.months)
        .bind(data.payment_date)
        .bind(data.next_payment_date)
        .bind(&data.notes)
        .bind(shared::util::now_millis())
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))
}

pub async fn soft_delete(
    exec: impl sqlx::Executor<'_, Database = Sqlite>,
    id: i64,
) -> RepoResult<Payment> {
    let sql = format!(
        "UPDATE payment SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL RETURNING {PAYMENT_COLUMNS}"
    );
    sqlx::query_as::<_, Payment>(&sql)
        .bind(shared::util::now_millis())
        .bind(id)
        .fetch_optional(exec)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::client::{self, NewClient};

    const JAN_1: i64 = 1_704_067_200_000;
    const FEB_1: i64 = 1_706_745_600_000;
    const MAR_1: i64 = 1_709_251_200_000;

    async fn setup() -> (DbService, i64) {
        let db = DbService::in_memory().await.unwrap();
        let c = client::insert(
            &db.pool,
            &NewClient {
                full_name: "NADIA".into(),
                registration_date: JAN_1,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (db, c.id)
    }

    fn monthly(client_id: i64, start: i64, end: i64) -> NewPayment {
        NewPayment {
            client_id,
            promotion_id: None,
            amount: 200.0,
            period: PaymentPeriod::Monthly,
            months: Some(1),
            payment_date: start,
            next_payment_date: end,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_overlap_query_is_half_open() {
        let (db, client_id) = setup().await;
        let jan = insert(&db.pool, &monthly(client_id, JAN_1, FEB_1)).await.unwrap();

        let hits = find_overlapping(&db.pool, client_id, JAN_1 + 1, MAR_1, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, jan.id);

        // adjacent interval does not intersect
        assert!(find_overlapping(&db.pool, client_id, FEB_1, MAR_1, None).await.unwrap().is_empty());
        // a payment never collides with itself
        assert!(
            find_overlapping(&db.pool, client_id, JAN_1, FEB_1, Some(jan.id))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_latest_and_deleted_payments() {
        let (db, client_id) = setup().await;
        insert(&db.pool, &monthly(client_id, JAN_1, FEB_1)).await.unwrap();
        let feb = insert(&db.pool, &monthly(client_id, FEB_1, MAR_1)).await.unwrap();

        let latest = latest_for_client(&db.pool, client_id).await.unwrap().unwrap();
        assert_eq!(latest.id, feb.id);

        soft_delete(&db.pool, feb.id).await.unwrap();
        let latest = latest_for_client(&db.pool, client_id).await.unwrap().unwrap();
        assert_eq!(latest.next_payment_date, FEB_1);
        assert!(find_by_id(&db.pool, feb.id).await.unwrap().is_none());
        assert!(find_overlapping(&db.pool, client_id, FEB_1, MAR_1, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_details_carry_names() {
        let (db, client_id) = setup().await;
        let p = insert(&db.pool, &monthly(client_id, JAN_1, FEB_1)).await.unwrap();

        let detail = find_detail(&db.pool, p.id).await.unwrap().unwrap();
        assert_eq!(detail.client_full_name, "NADIA");
        assert_eq!(detail.promotion_name, None);
        assert_eq!(detail.payment, p);

        assert_eq!(find_recent(&db.pool, 100).await.unwrap().len(), 1);
        assert_eq!(find_by_client(&db.pool, client_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_interval_rejected_by_schema() {
        let (db, client_id) = setup().await;
        let err = insert(&db.pool, &monthly(client_id, FEB_1, FEB_1)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
