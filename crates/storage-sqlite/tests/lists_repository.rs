//! Integration tests for the SQLite list repository.
//!
//! Each test gets its own temp-file database with migrations applied and
//! a live writer task, so the partial unique index, the soft-delete
//! filter, and the bulk update scoping are exercised against the real
//! engine.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use cartlist_core::errors::{DatabaseError, Error};
use cartlist_core::lists::{
    ListError, ListRepositoryTrait, ListService, ListServiceTrait, ListStatus, NewItem, NewList,
    NoopPurchaseNotifier,
};
use cartlist_storage_sqlite::db;
use cartlist_storage_sqlite::ListRepository;

fn setup() -> (TempDir, ListRepository) {
    let tmp = TempDir::new().unwrap();
    let db_file = tmp.path().join("cartlist-test.db");
    let db_path = db::init(db_file.to_str().unwrap()).unwrap();
    let pool = db::create_pool(&db_path).unwrap();
    db::run_migrations(&pool).unwrap();
    let writer = db::write_actor::spawn_writer((*pool).clone());
    (tmp, ListRepository::new(pool, writer))
}

fn new_list(user_id: &str, name: &str) -> NewList {
    NewList {
        user_id: user_id.to_string(),
        name: name.to_string(),
    }
}

fn new_item(list_id: i64, product_id: i64, market_id: Option<i64>, quantity: Decimal, unit_price: Decimal) -> NewItem {
    NewItem {
        list_id,
        product_id,
        market_id,
        quantity,
        unit_price,
    }
}

#[tokio::test]
async fn created_lists_start_open_with_zero_totals() {
    let (_tmp, repo) = setup();

    let list = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    assert!(list.id > 0);
    assert_eq!(list.status, ListStatus::Open);
    assert_eq!(list.projected_total, Decimal::ZERO);
    assert_eq!(list.settled_total, Decimal::ZERO);

    assert!(repo.has_open_list("u1").unwrap());
    assert!(!repo.has_open_list("u2").unwrap());
}

#[tokio::test]
async fn unique_index_rejects_a_second_open_list() {
    let (_tmp, repo) = setup();

    repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    let err = repo.create_list(new_list("u1", "Party")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::UniqueViolation(_))
    ));

    // A different owner is not affected, and neither is the same owner
    // once the first list is closed.
    repo.create_list(new_list("u2", "Party")).await.unwrap();
    let first = repo.get_lists("u1").unwrap().remove(0);
    repo.set_list_status(first.id, "u1", ListStatus::Closed)
        .await
        .unwrap();
    repo.create_list(new_list("u1", "Party")).await.unwrap();
}

#[tokio::test]
async fn reads_are_owner_scoped() {
    let (_tmp, repo) = setup();

    let list = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    assert!(repo.get_list(list.id, "u1").unwrap().is_some());
    assert!(repo.get_list(list.id, "u2").unwrap().is_none());
    assert!(repo.get_list(list.id + 100, "u1").unwrap().is_none());
}

#[tokio::test]
async fn totals_are_recomputed_from_the_active_item_snapshot() {
    let (_tmp, repo) = setup();

    let list = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    let first = repo
        .add_item(new_item(list.id, 42, Some(7), dec!(2), dec!(3.50)))
        .await
        .unwrap();
    repo.add_item(new_item(list.id, 43, Some(7), dec!(1), dec!(5.00)))
        .await
        .unwrap();

    let refreshed = repo.recompute_totals(list.id).await.unwrap();
    assert_eq!(refreshed.projected_total, dec!(12.00));
    assert_eq!(refreshed.settled_total, Decimal::ZERO);

    repo.set_item_purchased(first.id, true).await.unwrap();
    let refreshed = repo.recompute_totals(list.id).await.unwrap();
    assert_eq!(refreshed.projected_total, dec!(12.00));
    assert_eq!(refreshed.settled_total, dec!(7.00));

    // Soft-deleted items drop out of the snapshot.
    repo.remove_item(first.id).await.unwrap();
    let refreshed = repo.recompute_totals(list.id).await.unwrap();
    assert_eq!(refreshed.projected_total, dec!(5.00));
    assert_eq!(refreshed.settled_total, Decimal::ZERO);
}

#[tokio::test]
async fn soft_deleted_items_stay_invisible() {
    let (_tmp, repo) = setup();

    let list = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    let item = repo
        .add_item(new_item(list.id, 42, Some(7), dec!(1), dec!(2.00)))
        .await
        .unwrap();

    assert_eq!(repo.remove_item(item.id).await.unwrap(), 1);
    assert!(repo.get_item(item.id).unwrap().is_none());
    assert!(repo
        .get_list(list.id, "u1")
        .unwrap()
        .unwrap()
        .items
        .is_empty());

    // Removing again touches nothing; the tombstone keeps its timestamp.
    assert_eq!(repo.remove_item(item.id).await.unwrap(), 0);
    assert_eq!(repo.set_item_purchased(item.id, true).await.unwrap(), None);
}

#[tokio::test]
async fn set_item_purchased_only_touches_the_flag() {
    let (_tmp, repo) = setup();

    let list = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    let item = repo
        .add_item(new_item(list.id, 42, Some(7), dec!(2), dec!(3.50)))
        .await
        .unwrap();

    let updated = repo.set_item_purchased(item.id, true).await.unwrap().unwrap();
    assert!(updated.purchased);
    assert_eq!(updated.quantity, dec!(2));
    assert_eq!(updated.unit_price, dec!(3.50));
}

#[tokio::test]
async fn bulk_update_only_touches_unpurchased_items_in_open_lists() {
    let (_tmp, repo) = setup();

    // Open list: one pending item, one purchased, one pinned elsewhere,
    // one without a market.
    let open = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    let pending = repo
        .add_item(new_item(open.id, 42, Some(7), dec!(1), dec!(3.50)))
        .await
        .unwrap();
    let bought = repo
        .add_item(new_item(open.id, 42, Some(7), dec!(2), dec!(3.50)))
        .await
        .unwrap();
    repo.set_item_purchased(bought.id, true).await.unwrap();
    let other_market = repo
        .add_item(new_item(open.id, 42, Some(8), dec!(1), dec!(3.50)))
        .await
        .unwrap();
    let no_market = repo
        .add_item(new_item(open.id, 42, None, dec!(1), dec!(3.50)))
        .await
        .unwrap();

    // Closed list of another owner holding a matching item.
    let closed = repo.create_list(new_list("u2", "Pantry")).await.unwrap();
    let frozen = repo
        .add_item(new_item(closed.id, 42, Some(7), dec!(1), dec!(3.50)))
        .await
        .unwrap();
    repo.set_list_status(closed.id, "u2", ListStatus::Closed)
        .await
        .unwrap();

    let outcome = repo.bulk_update_price(42, 7, dec!(4.00)).await.unwrap();
    assert_eq!(outcome.items_updated, 1);
    assert_eq!(outcome.affected_lists, vec![open.id]);

    assert_eq!(
        repo.get_item(pending.id).unwrap().unwrap().unit_price,
        dec!(4.00)
    );
    for untouched in [bought.id, other_market.id, no_market.id, frozen.id] {
        assert_eq!(
            repo.get_item(untouched).unwrap().unwrap().unit_price,
            dec!(3.50)
        );
    }
}

#[tokio::test]
async fn bulk_update_reports_every_affected_list() {
    let (_tmp, repo) = setup();

    let first = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    repo.add_item(new_item(first.id, 42, Some(7), dec!(1), dec!(3.50)))
        .await
        .unwrap();
    let second = repo.create_list(new_list("u2", "Pantry")).await.unwrap();
    repo.add_item(new_item(second.id, 42, Some(7), dec!(3), dec!(3.50)))
        .await
        .unwrap();

    let outcome = repo.bulk_update_price(42, 7, dec!(4.00)).await.unwrap();
    assert_eq!(outcome.items_updated, 2);
    let mut affected = outcome.affected_lists.clone();
    affected.sort_unstable();
    assert_eq!(affected, vec![first.id, second.id]);

    // No matching items left once everything is purchased.
    let pending: Vec<_> = repo
        .get_list(first.id, "u1")
        .unwrap()
        .unwrap()
        .items
        .into_iter()
        .collect();
    for item in pending {
        repo.set_item_purchased(item.id, true).await.unwrap();
    }
    let outcome = repo.bulk_update_price(42, 7, dec!(5.00)).await.unwrap();
    assert_eq!(outcome.affected_lists, vec![second.id]);
}

#[tokio::test]
async fn status_updates_are_conditional_on_being_open() {
    let (_tmp, repo) = setup();

    let list = repo.create_list(new_list("u1", "Groceries")).await.unwrap();

    // Wrong owner, then wrong state.
    assert_eq!(
        repo.set_list_status(list.id, "u2", ListStatus::Closed)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        repo.set_list_status(list.id, "u1", ListStatus::Closed)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        repo.set_list_status(list.id, "u1", ListStatus::Cancelled)
            .await
            .unwrap(),
        0
    );

    let closed = repo.get_list(list.id, "u1").unwrap().unwrap();
    assert_eq!(closed.status, ListStatus::Closed);
}

#[tokio::test]
async fn concurrent_creates_leave_at_most_one_open_list() {
    let (_tmp, repo) = setup();
    let service: Arc<dyn ListServiceTrait> = Arc::new(ListService::new(
        Arc::new(repo),
        Arc::new(NoopPurchaseNotifier),
    ));

    let mut handles = Vec::new();
    for i in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.create_list("u1", &format!("List {i}")).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(Error::List(ListError::OpenListExists)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);

    let open: Vec<_> = service
        .get_lists("u1")
        .unwrap()
        .into_iter()
        .filter(|l| l.status == ListStatus::Open)
        .collect();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn lists_come_back_most_recently_created_first() {
    let (_tmp, repo) = setup();

    let first = repo.create_list(new_list("u1", "Groceries")).await.unwrap();
    repo.set_list_status(first.id, "u1", ListStatus::Closed)
        .await
        .unwrap();
    let second = repo.create_list(new_list("u1", "Party")).await.unwrap();

    let ids: Vec<i64> = repo.get_lists("u1").unwrap().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}
