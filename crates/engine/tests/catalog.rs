use chrono::Utc;

use engine::{
    BudgetPeriod, BudgetRow, CategoryRow, EngineError, EntryKind, MethodKind, MethodRow,
    RecordTransactionCmd,
};

mod common;
use common::{date, engine_with_db};

fn category(name: &str, icon: Option<&str>) -> CategoryRow {
    CategoryRow {
        name: name.to_string(),
        kind: EntryKind::Expense,
        icon: icon.map(ToString::to_string),
        color: None,
    }
}

#[tokio::test]
async fn category_sync_diffs_against_submission() {
    let (engine, _db) = engine_with_db().await;

    engine
        .sync_categories(
            "alice",
            &[category("Pets", Some("🐕")), category("Gym", None)],
            Utc::now(),
        )
        .await
        .unwrap();

    let before = engine.categories_for("alice").await.unwrap();
    let pets_id = before.iter().find(|c| c.name == "Pets").unwrap().id;

    // Second submission drops Gym, keeps Pets with a new icon, adds Books.
    engine
        .sync_categories(
            "alice",
            &[category("Pets", Some("🐈")), category("Books", None)],
            Utc::now(),
        )
        .await
        .unwrap();

    let after = engine.categories_for("alice").await.unwrap();
    assert!(after.iter().all(|c| c.name != "Gym"));
    assert!(after.iter().any(|c| c.name == "Books"));

    let pets = after.iter().find(|c| c.name == "Pets").unwrap();
    assert_eq!(pets.id, pets_id);
    assert_eq!(pets.icon.as_deref(), Some("🐈"));
}

#[tokio::test]
async fn category_sync_leaves_globals_alone() {
    let (engine, _db) = engine_with_db().await;

    engine
        .sync_categories("alice", &[category("Pets", None)], Utc::now())
        .await
        .unwrap();

    let visible = engine.categories_for("alice").await.unwrap();
    assert!(visible.iter().any(|c| c.name == "Groceries" && c.is_default));
    assert!(visible.iter().any(|c| c.name == "Pets" && !c.is_default));
}

#[tokio::test]
async fn blank_names_are_skipped() {
    let (engine, _db) = engine_with_db().await;

    engine
        .sync_categories(
            "alice",
            &[category("  ", None), category("Pets", None)],
            Utc::now(),
        )
        .await
        .unwrap();

    let own: Vec<_> = engine
        .categories_for("alice")
        .await
        .unwrap()
        .into_iter()
        .filter(|c| !c.is_default)
        .collect();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].name, "Pets");
}

#[tokio::test]
async fn duplicate_names_in_submission_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .sync_categories(
            "alice",
            &[category("Pets", None), category("Pets", Some("🐕"))],
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn payment_method_sync_diffs_against_submission() {
    let (engine, _db) = engine_with_db().await;

    engine
        .sync_payment_methods(
            "alice",
            &[MethodRow {
                name: "Meal vouchers".to_string(),
                kind: MethodKind::DigitalWallet,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    engine
        .sync_payment_methods("alice", &[], Utc::now())
        .await
        .unwrap();

    let visible = engine.payment_methods_for("alice").await.unwrap();
    assert!(visible.iter().all(|m| m.name != "Meal vouchers"));
    // Seeded globals survive an empty owner submission.
    assert!(visible.iter().any(|m| m.name == "Cash"));
}

#[tokio::test]
async fn budget_sync_replaces_and_drops_unknown_categories() {
    let (engine, _db) = engine_with_db().await;

    engine
        .sync_budgets(
            "alice",
            &[
                BudgetRow {
                    category: "Groceries".to_string(),
                    amount: 300.0,
                    period: BudgetPeriod::Monthly,
                },
                BudgetRow {
                    category: "Spaceships".to_string(),
                    amount: 50.0,
                    period: BudgetPeriod::Monthly,
                },
            ],
            Utc::now(),
        )
        .await
        .unwrap();

    let budgets = engine.budgets_for("alice").await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].category, "Groceries");
    assert!((budgets[0].amount - 300.0).abs() < 1e-9);

    engine
        .sync_budgets(
            "alice",
            &[BudgetRow {
                category: "Transport".to_string(),
                amount: 80.0,
                period: BudgetPeriod::Weekly,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    let budgets = engine.budgets_for("alice").await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].category, "Transport");
    assert_eq!(budgets[0].period, BudgetPeriod::Weekly);
}

#[tokio::test]
async fn budget_usage_accrues_spending_in_period() {
    let (engine, _db) = engine_with_db().await;

    engine
        .sync_budgets(
            "alice",
            &[BudgetRow {
                category: "Groceries".to_string(),
                amount: 300.0,
                period: BudgetPeriod::Monthly,
            }],
            Utc::now(),
        )
        .await
        .unwrap();

    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Groceries",
            EntryKind::Expense,
            45.0,
            date(2024, 6, 10),
            Utc::now(),
        ))
        .await
        .unwrap();
    // Outside the window, must not count.
    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Groceries",
            EntryKind::Expense,
            500.0,
            date(2024, 5, 10),
            Utc::now(),
        ))
        .await
        .unwrap();

    let usage = engine.budget_usage("alice", date(2024, 6, 20)).await.unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].category, "Groceries");
    assert!((usage[0].budget - 300.0).abs() < 1e-9);
    assert!((usage[0].spent - 45.0).abs() < 1e-9);
}

#[tokio::test]
async fn spending_by_category_groups_expenses() {
    let (engine, _db) = engine_with_db().await;

    for (category, amount) in [("Groceries", 30.0), ("Groceries", 20.0), ("Transport", 10.0)] {
        engine
            .record_transaction(RecordTransactionCmd::new(
                "alice",
                category,
                EntryKind::Expense,
                amount,
                date(2024, 6, 5),
                Utc::now(),
            ))
            .await
            .unwrap();
    }
    // Income never shows up in spending.
    engine
        .record_transaction(RecordTransactionCmd::new(
            "alice",
            "Salary",
            EntryKind::Income,
            1500.0,
            date(2024, 6, 1),
            Utc::now(),
        ))
        .await
        .unwrap();

    let totals = engine
        .spending_by_category("alice", date(2024, 6, 1), date(2024, 6, 30))
        .await
        .unwrap();
    assert!((totals["Groceries"] - 50.0).abs() < 1e-9);
    assert!((totals["Transport"] - 10.0).abs() < 1e-9);
    assert!(!totals.contains_key("Salary"));
}
