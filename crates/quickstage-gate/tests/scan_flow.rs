#![allow(clippy::unwrap_used)] // Integration tests use unwrap for brevity

//! End-to-end issuance and validation against a real `SQLite` store.
//!
//! Tests the full flow: issue → render payload → validate → usage ceiling,
//! plus the audit trail left behind by every attempt.

use std::num::NonZeroU32;
use std::sync::Arc;

use quickstage_crypto::{AdminSecret, signature};
use quickstage_gate::storage::UNRESOLVED_TICKET_ID;
use quickstage_gate::{
    Database, Rejection, ScanLogStore, ScanStatus, ScanValidator, TicketIssuer, TicketLocks,
};

fn admin() -> AdminSecret {
    AdminSecret::new("admin123")
}

/// Issuer and validator over one in-memory database.
async fn gate() -> (TicketIssuer<Database>, ScanValidator<Database>) {
    let db = Database::open_in_memory().await.unwrap();
    (TicketIssuer::new(db.clone()), ScanValidator::new(db))
}

/// Validate and acknowledge, returning the outcome message.
async fn scan(validator: &ScanValidator<Database>, payload: &str, secret: &AdminSecret) -> String {
    let outcome = validator.validate(payload, Some(secret)).await.unwrap();
    validator.reset();
    outcome.message()
}

#[tokio::test]
async fn single_use_ticket_scenario() {
    let (issuer, validator) = gate().await;
    let secret = admin();

    let ticket = issuer
        .issue(Some(&secret), NonZeroU32::MIN)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ticket.id, 1);

    let h = signature(1, &secret);
    let payload = format!("1.{h}");
    assert_eq!(ticket.payload().unwrap().to_string(), payload);

    let first = validator.validate(&payload, Some(&secret)).await.unwrap();
    assert!(first.is_valid());
    assert_eq!(
        validator.status(),
        ScanStatus::Success("Success".to_string())
    );
    validator.reset();

    assert_eq!(scan(&validator, &payload, &secret).await, "Usage limit exceeded");
    assert_eq!(scan(&validator, "1.wrong", &secret).await, "Invalid Hash");
}

#[tokio::test]
async fn malformed_payloads() {
    let (_, validator) = gate().await;
    let secret = admin();

    assert_eq!(scan(&validator, "abc", &secret).await, "Invalid format");
    assert_eq!(scan(&validator, "abc.deadbeef", &secret).await, "Invalid ID");
    assert_eq!(scan(&validator, "1.2.3", &secret).await, "Invalid format");
}

#[tokio::test]
async fn flipped_hex_character_is_invalid_hash() {
    let (issuer, validator) = gate().await;
    let secret = admin();
    let ticket = issuer
        .issue(Some(&secret), NonZeroU32::MIN)
        .await
        .unwrap()
        .unwrap();

    let mut tampered = ticket.signature.clone().into_bytes();
    tampered[10] = if tampered[10] == b'a' { b'b' } else { b'a' };
    let payload = format!("{}.{}", ticket.id, String::from_utf8(tampered).unwrap());

    assert_eq!(scan(&validator, &payload, &secret).await, "Invalid Hash");

    // The genuine payload is still unused.
    let genuine = ticket.payload().unwrap().to_string();
    assert_eq!(scan(&validator, &genuine, &secret).await, "Success");
}

#[tokio::test]
async fn never_issued_id_is_not_found() {
    let (issuer, validator) = gate().await;
    let secret = admin();
    issuer
        .issue(Some(&secret), NonZeroU32::MIN)
        .await
        .unwrap()
        .unwrap();

    let payload = format!("2.{}", signature(2, &secret));
    assert_eq!(scan(&validator, &payload, &secret).await, "Ticket not found in DB");
}

#[tokio::test]
async fn every_attempt_appends_exactly_one_entry() {
    let (issuer, validator) = gate().await;
    let secret = admin();
    let ticket = issuer
        .issue(Some(&secret), NonZeroU32::MIN)
        .await
        .unwrap()
        .unwrap();
    let payload = ticket.payload().unwrap().to_string();
    let unknown = format!("50.{}", signature(50, &secret));

    let attempts = [
        "abc",
        "abc.deadbeef",
        "1.wrong",
        unknown.as_str(),
        payload.as_str(),
        payload.as_str(),
    ];
    for (i, attempt) in attempts.iter().enumerate() {
        scan(&validator, attempt, &secret).await;
        let logs = validator.store().list_scan_logs().await.unwrap();
        assert_eq!(logs.len(), i + 1, "after attempt {attempt:?}");
    }

    let logs = validator.store().list_scan_logs().await.unwrap();
    let mut recorded: Vec<(i64, bool, String)> = logs
        .into_iter()
        .map(|l| (l.ticket_id, l.is_valid, l.message))
        .collect();
    recorded.reverse();

    assert_eq!(
        recorded,
        vec![
            (UNRESOLVED_TICKET_ID, false, "Invalid format".to_string()),
            (UNRESOLVED_TICKET_ID, false, "Invalid ID".to_string()),
            (1, false, "Invalid Hash".to_string()),
            (50, false, "Ticket not found in DB".to_string()),
            (1, true, "Success".to_string()),
            (1, false, "Usage limit exceeded".to_string()),
        ]
    );
}

#[tokio::test]
async fn secret_absent_skips_both_operations() {
    let (issuer, validator) = gate().await;

    assert!(issuer.issue(None, NonZeroU32::MIN).await.unwrap().is_none());
    assert!(validator.validate("1.abc", None).await.is_none());
    assert!(validator.store().list_scan_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_scans_of_single_use_ticket_admit_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("gate.db")).await.unwrap();
    let secret = admin();

    let ticket = TicketIssuer::new(db.clone())
        .issue(Some(&secret), NonZeroU32::MIN)
        .await
        .unwrap()
        .unwrap();
    let payload = ticket.payload().unwrap().to_string();

    // One validator per scanner, all serializing on the same lock registry.
    let locks = Arc::new(TicketLocks::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let validator = ScanValidator::with_locks(db.clone(), Arc::clone(&locks));
            let payload = payload.clone();
            let secret = secret.clone();
            tokio::spawn(async move { validator.validate(&payload, Some(&secret)).await })
        })
        .collect();

    let mut admitted = 0;
    let mut refused = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.is_valid() {
            admitted += 1;
        } else {
            assert_eq!(outcome.rejection(), Some(&Rejection::UsageLimitExceeded));
            refused += 1;
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(refused, 7);
    assert_eq!(db.count_valid_uses(ticket.id).await.unwrap(), 1);
    assert_eq!(db.list_scan_logs().await.unwrap().len(), 8);
    assert!(locks.is_empty());
}

#[tokio::test]
async fn multi_use_ticket_usage_report() {
    let (issuer, validator) = gate().await;
    let secret = admin();
    let ticket = issuer
        .issue(Some(&secret), NonZeroU32::new(3).unwrap())
        .await
        .unwrap()
        .unwrap();
    let payload = ticket.payload().unwrap().to_string();

    scan(&validator, &payload, &secret).await;
    scan(&validator, "1.wrong", &secret).await;

    let usage = validator.store().list_ticket_usage().await.unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].valid_uses, 1);
    assert_eq!(usage[0].remaining(), 2);
}
