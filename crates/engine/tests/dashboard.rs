use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{Amount, Engine, EngineError, NewExpense, NewUser, SplitCount, User};
use migration::MigratorTrait;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .timezone(chrono_tz::UTC)
        .build()
        .await
        .unwrap()
}

async fn register(engine: &Engine, username: &str, email: &str) -> User {
    engine
        .register_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "pw1".to_string(),
            confirm_password: "pw1".to_string(),
        })
        .await
        .unwrap()
}

async fn spend(engine: &Engine, user: &User, amount: f64, split: i32, at: DateTime<Utc>) {
    engine
        .create_expense(NewExpense {
            user_id: user.id,
            title: format!("spent {amount}"),
            amount: Amount::new(amount).unwrap(),
            split_with: SplitCount::new(split).unwrap(),
            spent_at: at,
        })
        .await
        .unwrap();
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn empty_user_has_zero_totals() {
    let engine = engine().await;
    let alice = register(&engine, "alice", "a@x.com").await;

    let dashboard = engine.dashboard(alice.id, at(2025, 3, 10)).await.unwrap();

    assert_eq!(dashboard.username, "alice");
    assert_eq!(dashboard.lifetime_total, 0.0);
    assert_eq!(dashboard.month_total, 0.0);
    assert_eq!(dashboard.total_people, 0);
    assert_eq!(dashboard.expense_count, 0);
    assert_eq!(dashboard.daily, vec![0.0; 31]);
}

#[tokio::test]
async fn month_and_lifetime_totals() {
    let engine = engine().await;
    let alice = register(&engine, "alice", "a@x.com").await;

    spend(&engine, &alice, 40.0, 4, at(2025, 3, 3)).await;
    spend(&engine, &alice, 10.0, 1, at(2025, 3, 17)).await;
    spend(&engine, &alice, 7.0, 2, at(2025, 2, 27)).await;
    spend(&engine, &alice, 3.0, 1, at(2024, 3, 3)).await;

    let dashboard = engine.dashboard(alice.id, at(2025, 3, 20)).await.unwrap();

    assert_eq!((dashboard.year, dashboard.month), (2025, 3));
    assert_eq!(dashboard.lifetime_total, 60.0);
    assert_eq!(dashboard.month_total, 50.0);
    assert_eq!(dashboard.total_people, 8);
    assert_eq!(dashboard.expense_count, 4);
    assert_eq!(dashboard.daily.len(), 31);
    assert_eq!(dashboard.daily[2], 40.0);
    assert_eq!(dashboard.daily[16], 10.0);
    assert_eq!(dashboard.daily.iter().sum::<f64>(), dashboard.month_total);
}

#[tokio::test]
async fn february_series_is_leap_year_aware() {
    let engine = engine().await;
    let alice = register(&engine, "alice", "a@x.com").await;
    spend(&engine, &alice, 5.0, 1, at(2024, 2, 29)).await;

    let leap = engine.dashboard(alice.id, at(2024, 2, 1)).await.unwrap();
    let common = engine.dashboard(alice.id, at(2025, 2, 1)).await.unwrap();

    assert_eq!(leap.daily.len(), 29);
    assert_eq!(leap.daily[28], 5.0);
    assert_eq!(common.daily.len(), 28);
    assert_eq!(common.month_total, 0.0);
}

#[tokio::test]
async fn totals_are_isolated_per_user() {
    let engine = engine().await;
    let alice = register(&engine, "alice", "a@x.com").await;
    let bob = register(&engine, "bob", "b@x.com").await;

    spend(&engine, &alice, 40.0, 4, at(2025, 3, 3)).await;
    spend(&engine, &bob, 1000.0, 10, at(2025, 3, 3)).await;

    let alice_view = engine.dashboard(alice.id, at(2025, 3, 5)).await.unwrap();
    let bob_view = engine.dashboard(bob.id, at(2025, 3, 5)).await.unwrap();

    assert_eq!(alice_view.lifetime_total, 40.0);
    assert_eq!(alice_view.total_people, 4);
    assert_eq!(bob_view.lifetime_total, 1000.0);
    assert_eq!(bob_view.month_total, 1000.0);
}

#[tokio::test]
async fn month_boundaries_follow_engine_timezone() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .timezone(chrono_tz::Asia::Tokyo)
        .build()
        .await
        .unwrap();
    let alice = register(&engine, "alice", "a@x.com").await;

    // 20:00 UTC on April 30th is May 1st, 05:00 in Tokyo.
    let evening = Utc.with_ymd_and_hms(2025, 4, 30, 20, 0, 0).unwrap();
    spend(&engine, &alice, 25.0, 1, evening).await;

    let april = engine.dashboard(alice.id, at(2025, 4, 15)).await.unwrap();
    let may = engine.dashboard(alice.id, at(2025, 5, 15)).await.unwrap();

    assert_eq!(april.month_total, 0.0);
    assert_eq!(may.month_total, 25.0);
    assert_eq!(may.daily[0], 25.0);
}

#[tokio::test]
async fn month_starting_in_dst_gap_still_resolves() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .timezone(chrono_tz::America::Asuncion)
        .build()
        .await
        .unwrap();
    let alice = register(&engine, "alice", "a@x.com").await;

    // 08:00 on September 30th and 02:00 on October 1st, local time.
    spend(&engine, &alice, 30.0, 1, Utc.with_ymd_and_hms(2023, 9, 30, 12, 0, 0).unwrap()).await;
    spend(&engine, &alice, 12.0, 1, Utc.with_ymd_and_hms(2023, 10, 1, 5, 0, 0).unwrap()).await;

    let september = engine
        .dashboard(alice.id, Utc.with_ymd_and_hms(2023, 9, 15, 15, 0, 0).unwrap())
        .await
        .unwrap();
    let october = engine
        .dashboard(alice.id, Utc.with_ymd_and_hms(2023, 10, 15, 15, 0, 0).unwrap())
        .await
        .unwrap();

    assert_eq!(september.month_total, 30.0);
    assert_eq!(september.daily[29], 30.0);
    assert_eq!(october.month_total, 12.0);
    assert_eq!(october.daily[0], 12.0);
    assert_eq!(october.lifetime_total, 42.0);
}

#[tokio::test]
async fn dashboard_for_unknown_user_fails() {
    let engine = engine().await;

    let err = engine.dashboard(7, Utc::now()).await.unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("user 7".to_string()));
}
