use chrono::Utc;

use engine::{EngineError, EntryKind, RecordTransactionCmd, TransactionListFilter};

mod common;
use common::{date, engine_with_db};

#[tokio::test]
async fn single_transaction_creates_one_row() {
    let (engine, _db) = engine_with_db().await;

    let purchase_id = engine
        .record_transaction(
            RecordTransactionCmd::new(
                "alice",
                "Groceries",
                EntryKind::Expense,
                42.5,
                date(2024, 3, 10),
                Utc::now(),
            )
            .payment_method("Cash")
            .details("weekly shop"),
        )
        .await
        .unwrap();

    let rows = engine
        .list_transactions(TransactionListFilter {
            owner: Some("alice".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.owner, "alice");
    assert_eq!(row.category, "Groceries");
    assert_eq!(row.payment_method.as_deref(), Some("Cash"));
    assert_eq!(row.kind, EntryKind::Expense);
    assert!((row.amount - 42.5).abs() < 1e-9);
    assert_eq!(row.installments_paid, 1);
    assert_eq!(row.installments_total, 1);
    assert_eq!(row.purchase_id, Some(purchase_id));
    assert!(!row.is_shared);
}

#[tokio::test]
async fn installments_share_purchase_and_split_amount() {
    let (engine, _db) = engine_with_db().await;

    let purchase_id = engine
        .record_transaction(
            RecordTransactionCmd::new(
                "alice",
                "Entertainment",
                EntryKind::Expense,
                100.0,
                date(2024, 1, 15),
                Utc::now(),
            )
            .installments(3),
        )
        .await
        .unwrap();

    let rows = engine
        .list_transactions(TransactionListFilter {
            owner: Some("alice".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    let total: f64 = rows.iter().map(|r| r.amount).sum();
    assert!((total - 100.0).abs() < 1e-9);
    for row in &rows {
        assert!((row.amount - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(row.purchase_id, Some(purchase_id));
        assert_eq!(row.installments_total, 3);
    }

    // Newest date first, so instalment counters run 3, 2, 1.
    assert_eq!(rows[0].installments_paid, 3);
    assert_eq!(rows[0].date, date(2024, 3, 15));
    assert_eq!(rows[1].installments_paid, 2);
    assert_eq!(rows[1].date, date(2024, 2, 15));
    assert_eq!(rows[2].installments_paid, 1);
    assert_eq!(rows[2].date, date(2024, 1, 15));
}

#[tokio::test]
async fn month_end_instalment_dates_clamp() {
    let (engine, _db) = engine_with_db().await;

    engine
        .record_transaction(
            RecordTransactionCmd::new(
                "alice",
                "Home",
                EntryKind::Expense,
                90.0,
                date(2024, 1, 31),
                Utc::now(),
            )
            .installments(3),
        )
        .await
        .unwrap();

    let rows = engine
        .list_transactions(TransactionListFilter::default())
        .await
        .unwrap();
    let dates: Vec<_> = rows.iter().map(|r| r.date).collect();

    assert!(dates.contains(&date(2024, 1, 31)));
    assert!(dates.contains(&date(2024, 2, 29)));
    assert!(dates.contains(&date(2024, 3, 31)));
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Spaceships",
            EntryKind::Expense,
            10.0,
            date(2024, 5, 1),
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn category_kind_must_match() {
    let (engine, _db) = engine_with_db().await;

    // "Groceries" is seeded as an expense category.
    let err = engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Groceries",
            EntryKind::Income,
            10.0,
            date(2024, 5, 1),
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn unknown_payment_method_is_dropped() {
    let (engine, _db) = engine_with_db().await;

    engine
        .record_transaction(
            RecordTransactionCmd::new(
                "alice",
                "Transport",
                EntryKind::Expense,
                12.0,
                date(2024, 5, 1),
                Utc::now(),
            )
            .payment_method("Monopoly money"),
        )
        .await
        .unwrap();

    let rows = engine
        .list_transactions(TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(rows[0].payment_method, None);
}

#[tokio::test]
async fn invalid_amounts_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let zero = engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Groceries",
            EntryKind::Expense,
            0.0,
            date(2024, 5, 1),
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(zero, EngineError::InvalidAmount(_)));

    let no_installments = engine
        .record_transaction(
            RecordTransactionCmd::new(
                "alice",
                "Groceries",
                EntryKind::Expense,
                10.0,
                date(2024, 5, 1),
                Utc::now(),
            )
            .installments(0),
        )
        .await
        .unwrap_err();
    assert!(matches!(no_installments, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn list_filters_by_date_and_kind() {
    let (engine, _db) = engine_with_db().await;

    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Groceries",
            EntryKind::Expense,
            20.0,
            date(2024, 1, 10),
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Salary",
            EntryKind::Income,
            1500.0,
            date(2024, 2, 1),
            Utc::now(),
        ))
        .await
        .unwrap();

    let incomes = engine
        .list_transactions(TransactionListFilter {
            kind: Some(EntryKind::Income),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].category, "Salary");

    let january = engine
        .list_transactions(TransactionListFilter {
            from: Some(date(2024, 1, 1)),
            to: Some(date(2024, 1, 31)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(january.len(), 1);
    assert_eq!(january[0].category, "Groceries");

    let inverted = engine
        .list_transactions(TransactionListFilter {
            from: Some(date(2024, 2, 1)),
            to: Some(date(2024, 1, 1)),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(inverted, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn revision_moves_after_writes() {
    let (engine, _db) = engine_with_db().await;

    let before = engine.revision();
    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Groceries",
            EntryKind::Expense,
            5.0,
            date(2024, 5, 1),
            Utc::now(),
        ))
        .await
        .unwrap();
    assert!(engine.revision() > before);
}
