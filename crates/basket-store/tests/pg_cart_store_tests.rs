//! Integration tests for `PgCartStore`. Run with `DATABASE_URL` pointing at a
//! disposable PostgreSQL instance and `cargo test -- --ignored`.

use basket_core::store::{CartSnapshot, CartStore, SessionKey};
use basket_store::pg_cart_store::PgCartStore;
use chrono::{DurationRound, TimeDelta, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Helper to build a snapshot with one line. Postgres keeps microseconds, so
/// the timestamp is truncated to make round-trip comparisons exact.
fn make_snapshot(version: i64, quantity: u32) -> CartSnapshot {
    CartSnapshot {
        cart_id: Uuid::new_v4(),
        version,
        items: serde_json::json!([{
            "variant_id": "sku-1",
            "product_id": null,
            "product_name": "Mug",
            "unit_price": "12.50",
            "quantity": quantity,
            "image_url": null,
            "variant_name": null
        }]),
        saved_at: Utc::now()
            .duration_trunc(TimeDelta::microseconds(1))
            .unwrap(),
    }
}

fn key(raw: &str) -> SessionKey {
    SessionKey::parse(raw).unwrap()
}

// --- load ---

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn test_load_returns_none_for_unknown_session(pool: PgPool) {
    let store = PgCartStore::new(pool);

    let loaded = store.load(&key("nobody")).await.unwrap();

    assert!(loaded.is_none());
}

// --- save + load ---

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn test_save_then_load_returns_snapshot(pool: PgPool) {
    let store = PgCartStore::new(pool);
    let snapshot = make_snapshot(3, 2);

    store.save(&key("web-1"), &snapshot).await.unwrap();
    let loaded = store.load(&key("web-1")).await.unwrap().unwrap();

    assert_eq!(loaded, snapshot);
}

// --- overwrite ---

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn test_save_overwrites_previous_snapshot(pool: PgPool) {
    let store = PgCartStore::new(pool);
    let first = make_snapshot(1, 1);
    let second = make_snapshot(2, 5);

    store.save(&key("web-1"), &first).await.unwrap();
    store.save(&key("web-1"), &second).await.unwrap();
    let loaded = store.load(&key("web-1")).await.unwrap().unwrap();

    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.cart_id, second.cart_id);
    assert_eq!(loaded.items[0]["quantity"], 5);
}

// --- isolation ---

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn test_sessions_are_isolated(pool: PgPool) {
    let store = PgCartStore::new(pool);

    store.save(&key("web-1"), &make_snapshot(1, 1)).await.unwrap();

    assert!(store.load(&key("web-2")).await.unwrap().is_none());
}

// --- delete ---

#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_removes_snapshot_and_tolerates_missing_key(pool: PgPool) {
    let store = PgCartStore::new(pool);
    store.save(&key("web-1"), &make_snapshot(1, 1)).await.unwrap();

    store.delete(&key("web-1")).await.unwrap();
    store.delete(&key("web-1")).await.unwrap();

    assert!(store.load(&key("web-1")).await.unwrap().is_none());
}
