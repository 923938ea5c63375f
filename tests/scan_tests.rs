mod common;

use common::{CountingOutage, STUDENT, account_id, seeded};
use foodcard::application::settlement::SettlementEngine;
use foodcard::domain::money::Money;
use foodcard::domain::ports::SharedNotifier;
use foodcard::error::WalletError;
use foodcard::infrastructure::notifier::LogNotifier;
use foodcard::interfaces::scan::ScanIngest;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn outage_scanner() -> (ScanIngest, Arc<CountingOutage>) {
    let store = Arc::new(CountingOutage::default());
    let notifier: SharedNotifier = Arc::new(LogNotifier);
    let engine = SettlementEngine::new(
        store.clone(),
        store.clone(),
        notifier,
        Duration::from_millis(100),
    );
    (ScanIngest::new(Arc::new(engine)), store)
}

#[tokio::test]
async fn test_malformed_payload_never_touches_storage() {
    let (scanner, store) = outage_scanner();

    for raw in ["", "{\"orderId\":", "{\"amount\":60}", "not an id"] {
        let result = scanner.ingest(raw).await;
        assert!(
            matches!(result, Err(WalletError::MalformedPayload(_))),
            "{raw:?}: {result:?}"
        );
    }
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_storage_outage_is_retryable() {
    let (scanner, store) = outage_scanner();

    let err = scanner.ingest("ord-1").await.unwrap_err();
    assert!(matches!(err, WalletError::StoreUnavailable(_)));
    assert!(err.is_retryable());
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_qr_json_settles_the_stored_total() {
    let (_stores, services) = seeded(10_000, &[("6523f1c2ab34cd56ef789012", dec!(60))]).await;
    let scanner = ScanIngest::new(services.engine.clone());

    // The printed amount is stale; the stored total is what gets charged.
    let receipt = scanner
        .ingest(r#"{"orderId":"6523f1c2ab34cd56ef789012","amount":55,"studentName":"Asha"}"#)
        .await
        .unwrap();
    assert_eq!(receipt.debited, Money::from_minor(6_000));
    assert_eq!(receipt.new_balance, Money::from_minor(4_000));

    let rescan = scanner.ingest("6523f1c2ab34cd56ef789012").await;
    assert!(matches!(rescan, Err(WalletError::AlreadySettled(_))));
    assert_eq!(
        services.engine.balance(&account_id(STUDENT)).await.unwrap(),
        Money::from_minor(4_000)
    );
}
