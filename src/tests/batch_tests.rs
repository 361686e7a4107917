use super::doubles::FlakyBalanceStore;
use super::*;
use crate::api::handlers::{AppState, api_routes};
use crate::core::constants::MONTHLY_BALANCES_GENERATED;
use crate::core::errors::LedgerError;
use crate::core::period::YearMonth;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::BalanceStore;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn batch_covers_every_user() {
    let services = create_test_services();
    for user in ["u1", "u2", "u3"] {
        seed_user(&services.storage, user).await;
    }
    seed_income(&services.storage, "i1", "u2", dec!(10), date(2024, 6, 1)).await;

    let report = services
        .balances
        .generate_monthly_balances(Some(2024), Some(6), date(2024, 9, 1))
        .await
        .unwrap();

    assert_eq!(report.period, YearMonth::new(2024, 6).unwrap());
    assert_eq!(report.total_users, 3);
    assert_eq!(report.succeeded, 3);
    assert!(report.failures.is_empty());
    for user in ["u1", "u2", "u3"] {
        assert_eq!(services.storage.monthly_balance_count(user).await, 1);
    }
    let u2 = services.storage.find_monthly_balance("u2", 2024, 6).await.unwrap().unwrap();
    assert_eq!(u2.closing_balance, dec!(10));
}

#[tokio::test]
async fn failing_user_does_not_abort_batch() {
    let inner = InMemoryStorage::new();
    for user in ["u1", "u2", "u3"] {
        seed_user(&inner, user).await;
    }
    let mut store = FlakyBalanceStore::new(inner.clone());
    store.failing_users.push("u2".to_string());
    let logging = InMemoryLogging::new();
    let balances = BalanceService::new(store, logging.clone()).with_batch_concurrency(2);

    let report = balances
        .generate_monthly_balances(Some(2024), Some(6), date(2024, 9, 1))
        .await
        .unwrap();

    assert_eq!(report.total_users, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].user_id, "u2");
    assert!(report.failures[0].error.contains("connection reset"));
    assert_eq!(inner.monthly_balance_count("u1").await, 1);
    assert_eq!(inner.monthly_balance_count("u2").await, 0);
    assert_eq!(inner.monthly_balance_count("u3").await, 1);

    let logs = logging.get_logs().await.unwrap();
    let entry = logs.iter().find(|l| l.action == MONTHLY_BALANCES_GENERATED).unwrap();
    assert_eq!(entry.details["failed"], 1);
    assert_eq!(entry.details["succeeded"], 2);
}

#[tokio::test]
async fn defaults_to_the_month_before_today() {
    let services = create_test_services();
    seed_user(&services.storage, "u1").await;

    let report = services
        .balances
        .generate_monthly_balances(None, None, date(2024, 1, 15))
        .await
        .unwrap();

    assert_eq!(report.period, YearMonth::new(2023, 12).unwrap());
    assert!(services.storage.find_monthly_balance("u1", 2023, 12).await.unwrap().is_some());
}

#[tokio::test]
async fn partial_period_is_rejected() {
    let services = create_test_services();
    seed_user(&services.storage, "u1").await;

    let err = services
        .balances
        .generate_monthly_balances(Some(2020), None, date(2024, 7, 4))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(ref field, _) if field == "month"));

    let err = services
        .balances
        .generate_monthly_balances(None, Some(3), date(2024, 7, 4))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(ref field, _) if field == "year"));

    assert_eq!(services.storage.monthly_balance_count("u1").await, 0);
}

#[tokio::test]
async fn rejects_invalid_month() {
    let services = create_test_services();
    seed_user(&services.storage, "u1").await;

    let err = services
        .balances
        .generate_monthly_balances(Some(2024), Some(13), date(2024, 7, 4))
        .await
        .unwrap_err();

    assert_eq!(err, LedgerError::InvalidPeriod { year: 2024, month: 13 });
    assert_eq!(services.storage.monthly_balance_count("u1").await, 0);
}

#[tokio::test]
async fn rerunning_a_batch_keeps_snapshots_frozen() {
    let services = create_test_services();
    seed_user(&services.storage, "u1").await;
    seed_income(&services.storage, "i1", "u1", dec!(5), date(2024, 6, 1)).await;

    services
        .balances
        .generate_monthly_balances(Some(2024), Some(6), date(2024, 7, 1))
        .await
        .unwrap();
    seed_income(&services.storage, "i2", "u1", dec!(95), date(2024, 6, 2)).await;
    let report = services
        .balances
        .generate_monthly_balances(Some(2024), Some(6), date(2024, 7, 1))
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    let june = services.storage.find_monthly_balance("u1", 2024, 6).await.unwrap().unwrap();
    assert_eq!(june.closing_balance, dec!(5));

    let logs = services.logging.get_logs().await.unwrap();
    assert_eq!(
        logs.iter().filter(|l| l.action == MONTHLY_BALANCES_GENERATED).count(),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_runs_on_a_spawned_task() {
    let services = create_test_services();
    for user in ["u1", "u2"] {
        seed_user(&services.storage, user).await;
    }
    let balances = Arc::new(services.balances);

    let runner = balances.clone();
    let report = tokio::spawn(async move {
        runner
            .generate_for_all_users(YearMonth::new(2024, 2).unwrap())
            .await
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(services.storage.monthly_balance_count("u2").await, 1);
}

#[tokio::test]
async fn router_accepts_the_service_state() {
    let services = create_test_services();
    let state = AppState {
        balances: Arc::new(services.balances),
        adjustments: Arc::new(services.adjustments),
    };

    let _router = api_routes(state);
}
