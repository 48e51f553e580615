use chrono::Utc;
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use engine::{
    EngineError, GroupRef, SharedExpenseCmd, SplitSpec, TransactionListFilter,
};

mod common;
use common::{add_user, date, engine_with_db};

fn dinner(group: GroupRef) -> SharedExpenseCmd {
    SharedExpenseCmd::new(
        "alice",
        "Groceries",
        100.0,
        date(2024, 6, 1),
        group,
        Utc::now(),
    )
    .participant("bob")
    .participant("carol")
    .details("market run")
}

#[tokio::test]
async fn equal_split_three_ways() {
    let (engine, db) = engine_with_db().await;
    add_user(&engine, "bob", "Bob").await;
    add_user(&engine, "carol", "Carol").await;

    let transaction_id = engine
        .add_shared_expense(dinner(GroupRef::New {
            name: "Flat".to_string(),
            description: None,
        }))
        .await
        .unwrap();

    // The payer keeps the full outflow on their own ledger.
    let rows = engine
        .list_transactions(TransactionListFilter {
            owner: Some("alice".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, transaction_id);
    assert!(rows[0].is_shared);
    assert!((rows[0].amount - 100.0).abs() < 1e-9);
    assert_eq!(rows[0].group.as_deref(), Some("Flat"));

    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT original_amount FROM transactions WHERE id = ?",
            vec![transaction_id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let original: f64 = row.try_get("", "original_amount").unwrap();
    assert!((original - 100.0).abs() < 1e-9);

    // Each of the other two owes a third.
    for debtor in ["bob", "carol"] {
        let pending = engine.pending_splits_for(debtor).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert!((pending[0].amount - 100.0 / 3.0).abs() < 1e-9);
        assert!((pending[0].percentage.unwrap() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(pending[0].payer, "alice");
        assert_eq!(pending[0].payer_name, "Alice");
        assert_eq!(pending[0].category, "Groceries");

        let balance = engine.pending_balance(debtor).await.unwrap();
        assert!((balance - 100.0 / 3.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn payer_never_owes_themselves() {
    let (engine, _db) = engine_with_db().await;
    add_user(&engine, "bob", "Bob").await;
    add_user(&engine, "carol", "Carol").await;

    engine
        .add_shared_expense(dinner(GroupRef::New {
            name: "Flat".to_string(),
            description: None,
        }))
        .await
        .unwrap();

    assert!(engine.pending_splits_for("alice").await.unwrap().is_empty());
    let balance = engine.pending_balance("alice").await.unwrap();
    assert!(balance.abs() < 1e-9);
}

#[tokio::test]
async fn explicit_shares_are_recorded_verbatim() {
    let (engine, _db) = engine_with_db().await;
    add_user(&engine, "bob", "Bob").await;
    add_user(&engine, "carol", "Carol").await;

    let cmd = SharedExpenseCmd::new(
        "alice",
        "Groceries",
        60.0,
        date(2024, 6, 2),
        GroupRef::New {
            name: "Trip".to_string(),
            description: Some("summer".to_string()),
        },
        Utc::now(),
    )
    .split(SplitSpec::Explicit(vec![
        ("bob".to_string(), 20.0),
        ("carol".to_string(), 30.0),
    ]));

    // 10 of the 60 is unassigned; the engine records the shares anyway.
    assert!((cmd.discrepancy() - 10.0).abs() < 1e-9);
    engine.add_shared_expense(cmd).await.unwrap();

    let bob = engine.pending_splits_for("bob").await.unwrap();
    assert!((bob[0].amount - 20.0).abs() < 1e-9);
    assert!((bob[0].percentage.unwrap() - 100.0 / 3.0).abs() < 1e-9);

    let carol = engine.pending_splits_for("carol").await.unwrap();
    assert!((carol[0].amount - 30.0).abs() < 1e-9);
    assert!((carol[0].percentage.unwrap() - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn settle_split_is_idempotent() {
    let (engine, db) = engine_with_db().await;
    add_user(&engine, "bob", "Bob").await;
    add_user(&engine, "carol", "Carol").await;

    engine
        .add_shared_expense(dinner(GroupRef::New {
            name: "Flat".to_string(),
            description: None,
        }))
        .await
        .unwrap();

    let split_id = engine.pending_splits_for("bob").await.unwrap()[0].id;
    engine.settle_split(split_id, Utc::now()).await.unwrap();
    engine.settle_split(split_id, Utc::now()).await.unwrap();

    assert!(engine.pending_splits_for("bob").await.unwrap().is_empty());
    let balance = engine.pending_balance("bob").await.unwrap();
    assert!(balance.abs() < 1e-9);

    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT status FROM expense_splits WHERE id = ?",
            vec![split_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let status: String = row.try_get("", "status").unwrap();
    assert_eq!(status, "paid");
}

#[tokio::test]
async fn settle_unknown_split_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.settle_split(999, Utc::now()).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn group_creator_is_always_enrolled() {
    let (engine, db) = engine_with_db().await;
    add_user(&engine, "bob", "Bob").await;

    let group_id = engine
        .create_expense_group(
            "Flat",
            Some("rent and bills"),
            "alice",
            &["bob".to_string()],
            Utc::now(),
        )
        .await
        .unwrap();

    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT COUNT(*) AS count FROM group_members WHERE group_id = ?",
            vec![group_id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let members: i32 = row.try_get("", "count").unwrap();
    assert_eq!(members, 2);
}

#[tokio::test]
async fn shared_expense_against_existing_group() {
    let (engine, _db) = engine_with_db().await;
    add_user(&engine, "bob", "Bob").await;
    add_user(&engine, "carol", "Carol").await;

    let group_id = engine
        .create_expense_group(
            "Flat",
            None,
            "alice",
            &["bob".to_string(), "carol".to_string()],
            Utc::now(),
        )
        .await
        .unwrap();

    engine
        .add_shared_expense(dinner(GroupRef::Existing(group_id)))
        .await
        .unwrap();

    let pending = engine.pending_splits_for("bob").await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].group.as_deref(), Some("Flat"));
}

#[tokio::test]
async fn unknown_group_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    add_user(&engine, "bob", "Bob").await;
    add_user(&engine, "carol", "Carol").await;

    let err = engine
        .add_shared_expense(dinner(GroupRef::Existing(Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
