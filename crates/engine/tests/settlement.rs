use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, ExpenseCmd, MoneyCents, Period, settlement};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Creates the three-member household every scenario uses: m1 creates it,
/// m2/m3 join through the invite code.
async fn household_of_three(engine: &Engine) -> String {
    for member in ["m1", "m2", "m3"] {
        engine
            .new_member(member, "password", member)
            .await
            .unwrap();
    }

    let household_id = engine.new_household("Flat 3B", "m1").await.unwrap();
    let code = engine
        .household_of("m1")
        .await
        .unwrap()
        .unwrap()
        .code;
    engine.join_household(&code, "m2").await.unwrap();
    engine.join_household(&code, "m3").await.unwrap();
    household_id
}

fn august() -> Period {
    Period::new(2026, 8).unwrap()
}

fn in_august(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn equal_and_partial_splits_settle_with_one_transfer() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    // A = 30€ paid by m1 for everyone, B = 20€ paid by m2 for m1 and m2.
    engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "Groceries", 3000, in_august(3))
                .category("groceries")
                .split_equal(vec!["m1".into(), "m2".into(), "m3".into()]),
        )
        .await
        .unwrap();
    engine
        .add_expense(
            ExpenseCmd::new(&household, "m2", "Takeaway", 2000, in_august(5))
                .category("leisure")
                .split_equal(vec!["m1".into(), "m2".into()]),
        )
        .await
        .unwrap();

    let balances = engine
        .period_balances(&household, august(), "m1")
        .await
        .unwrap();
    assert_eq!(balances["m1"], MoneyCents::new(1000));
    assert_eq!(balances["m2"], MoneyCents::ZERO);
    assert_eq!(balances["m3"], MoneyCents::new(-1000));
    assert_eq!(
        balances.values().copied().sum::<MoneyCents>(),
        MoneyCents::ZERO
    );

    let plan = engine
        .settlement_plan(&household, august(), "m1")
        .await
        .unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].from, "m3");
    assert_eq!(plan[0].to, "m1");
    assert_eq!(plan[0].amount, MoneyCents::new(1000));
}

#[tokio::test]
async fn custom_split_credits_payer_with_the_rest() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "Utilities", 10_000, in_august(10))
                .category("utilities")
                .split_custom(BTreeMap::from([
                    ("m1".to_string(), 2000),
                    ("m2".to_string(), 8000),
                ])),
        )
        .await
        .unwrap();

    let balances = engine
        .period_balances(&household, august(), "m2")
        .await
        .unwrap();
    assert_eq!(balances["m1"], MoneyCents::new(8000));
    assert_eq!(balances["m2"], MoneyCents::new(-8000));
    assert_eq!(balances["m3"], MoneyCents::ZERO);
}

#[tokio::test]
async fn custom_split_mismatch_is_never_written() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    let result = engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "Broken", 10_000, in_august(1))
                .split_custom(BTreeMap::from([("m1".to_string(), 9_999)])),
        )
        .await;
    assert!(matches!(result, Err(EngineError::SplitMismatch(_))));

    let expenses = engine
        .list_expenses(&household, august(), "m1")
        .await
        .unwrap();
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn all_zero_custom_split_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    let result = engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "Nothing", 100, in_august(1))
                .split_custom(BTreeMap::from([("m1".to_string(), 0)])),
        )
        .await;
    assert!(matches!(result, Err(EngineError::InvalidSplit(_))));
}

#[tokio::test]
async fn recorded_settlement_rezeroes_the_period() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "Groceries", 3000, in_august(3))
                .category("groceries")
                .split_equal(vec!["m1".into(), "m2".into(), "m3".into()]),
        )
        .await
        .unwrap();
    engine
        .add_expense(
            ExpenseCmd::new(&household, "m2", "Takeaway", 2000, in_august(5))
                .category("leisure")
                .split_equal(vec!["m1".into(), "m2".into()]),
        )
        .await
        .unwrap();

    // m3 pays m1 the planned transfer.
    engine
        .record_settlement(&household, "m3", "m1", 1000, in_august(28), "m3")
        .await
        .unwrap();

    let balances = engine
        .period_balances(&household, august(), "m1")
        .await
        .unwrap();
    assert!(balances.values().all(|b| b.is_zero()));

    let plan = engine
        .settlement_plan(&household, august(), "m1")
        .await
        .unwrap();
    assert!(plan.is_empty());
}

#[tokio::test]
async fn balances_only_cover_the_requested_period() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "August rent", 90_000, in_august(1))
                .category("home")
                .split_equal(vec![]),
        )
        .await
        .unwrap();
    engine
        .add_expense(
            ExpenseCmd::new(
                &household,
                "m2",
                "July leftovers",
                500,
                Utc.with_ymd_and_hms(2026, 7, 31, 23, 0, 0).unwrap(),
            )
            .split_equal(vec![]),
        )
        .await
        .unwrap();

    let expenses = engine
        .list_expenses(&household, august(), "m1")
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].title, "August rent");

    // Empty split_among defaulted to the full roster.
    assert_eq!(
        expenses[0].split.beneficiaries(),
        ["m1", "m2", "m3"]
    );
}

#[tokio::test]
async fn spending_summary_skips_settlements() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "Groceries", 3000, in_august(3))
                .category("groceries")
                .split_equal(vec![]),
        )
        .await
        .unwrap();
    engine
        .record_settlement(&household, "m2", "m1", 1000, in_august(4), "m2")
        .await
        .unwrap();

    let summary = engine
        .monthly_spending(&household, august(), "m1")
        .await
        .unwrap();
    assert_eq!(summary.total, MoneyCents::new(3000));
    assert_eq!(summary.by_category.get("settlement"), None);
    assert_eq!(
        summary.by_category["groceries"],
        MoneyCents::new(3000)
    );
}

#[tokio::test]
async fn outsiders_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    engine
        .new_member("stranger", "password", "Stranger")
        .await
        .unwrap();

    let result = engine.list_expenses(&household, august(), "stranger").await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn updated_expense_is_revalidated_and_replaced() {
    let (engine, _db) = engine_with_db().await;
    let household = household_of_three(&engine).await;

    let id = engine
        .add_expense(
            ExpenseCmd::new(&household, "m1", "Groceries", 3000, in_august(3))
                .category("groceries")
                .split_equal(vec![]),
        )
        .await
        .unwrap();

    engine
        .update_expense(
            id,
            ExpenseCmd::new(&household, "m1", "Groceries (fixed)", 3300, in_august(3))
                .category("groceries")
                .split_equal(vec!["m1".into(), "m2".into(), "m3".into()]),
        )
        .await
        .unwrap();

    let expenses = engine
        .list_expenses(&household, august(), "m1")
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].title, "Groceries (fixed)");
    assert_eq!(expenses[0].amount, MoneyCents::new(3300));

    // 3300 / 3 splits cleanly; the balance map still sums to zero.
    let balances = engine
        .period_balances(&household, august(), "m1")
        .await
        .unwrap();
    assert_eq!(
        balances.values().copied().sum::<MoneyCents>(),
        MoneyCents::ZERO
    );
    assert_eq!(settlement::plan(&balances).len(), 2);
}
