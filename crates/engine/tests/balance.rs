use chrono::{DateTime, Days, TimeDelta, Utc};
use sea_orm::Database;

use engine::{
    AdjustBalanceCmd, CreateMemberCmd, EndSession, Engine, EngineError, Hours, MemberSearchFilter,
    RecordPurchaseCmd, RolloverStatus, SessionStatus, StartPolicy, StartSessionCmd,
    UpdateMemberCmd,
};
use migration::MigratorTrait;

async fn new_engine() -> Engine {
    new_engine_with_policy(StartPolicy::default()).await
}

async fn new_engine_with_policy(policy: StartPolicy) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .start_policy(policy)
        .build()
        .await
        .unwrap()
}

/// Creates a branch and a member assigned to it, returning `(member_id,
/// branch_id)`.
async fn member_with_branch(engine: &Engine) -> (String, String) {
    let branch = engine.create_branch("Makati", None).await.unwrap();
    let member = engine
        .create_member(CreateMemberCmd::new("Ana Cruz", "09171234567").branch_id(&branch.id))
        .await
        .unwrap();
    (member.id, branch.id)
}

fn ts(date: &str) -> DateTime<Utc> {
    format!("{date}T12:00:00Z").parse().unwrap()
}

fn hours(amount: &str) -> Hours {
    amount.parse().unwrap()
}

#[tokio::test]
async fn first_purchase_has_no_rollover() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    let purchase = engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("60"), "admin"))
        .await
        .unwrap();

    assert_eq!(purchase.rollover_status, RolloverStatus::NotApplicable);
    assert_eq!(purchase.total_valid_purchased, hours("60"));

    let balance = engine.balance(&member_id).await.unwrap();
    assert_eq!(balance.granted, hours("60"));
    assert_eq!(balance.used, Hours::ZERO);
    assert_eq!(balance.balance, hours("60"));
}

#[tokio::test]
async fn renewal_within_window_applies_rollover() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    // 100h purchased 2025-01-01, expiring 2026-01-01; 30h consumed since.
    let first = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("100"), "admin")
                .purchased_at(ts("2025-01-01")),
        )
        .await
        .unwrap();
    engine
        .adjust_balance(AdjustBalanceCmd::new(
            &member_id,
            hours("30"),
            "migrated usage",
            "admin",
        ))
        .await
        .unwrap();

    // Renewal 100 days after expiry, inside the 180-day window.
    let second = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2026-04-11")),
        )
        .await
        .unwrap();

    assert_eq!(second.total_valid_purchased, hours("130"));
    assert_eq!(second.rollover_status, RolloverStatus::Pending);
    assert_eq!(
        engine.rollover_status(&first.id).await.unwrap(),
        RolloverStatus::Applied
    );

    // Only the base hours hit the granted accumulator.
    let balance = engine.balance(&member_id).await.unwrap();
    assert_eq!(balance.granted, hours("160"));
    assert_eq!(balance.used, hours("30"));
}

#[tokio::test]
async fn renewal_after_window_forfeits_rollover() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    let first = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("100"), "admin")
                .purchased_at(ts("2025-01-01")),
        )
        .await
        .unwrap();
    engine
        .adjust_balance(AdjustBalanceCmd::new(
            &member_id,
            hours("30"),
            "migrated usage",
            "admin",
        ))
        .await
        .unwrap();

    // 200 days after expiry: past the 180-day deadline.
    let second = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2026-07-20")),
        )
        .await
        .unwrap();

    assert_eq!(second.total_valid_purchased, hours("60"));
    assert_eq!(
        engine.rollover_status(&first.id).await.unwrap(),
        RolloverStatus::Forfeited
    );
}

#[tokio::test]
async fn back_to_back_renewals_evaluate_independently() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    let p1 = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("100"), "admin")
                .purchased_at(ts("2026-05-01")),
        )
        .await
        .unwrap();
    let p2 = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2026-05-02")),
        )
        .await
        .unwrap();
    let p3 = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("50"), "admin")
                .purchased_at(ts("2026-05-03")),
        )
        .await
        .unwrap();

    // Each renewal rolls over only its immediate predecessor's unused total.
    assert_eq!(p2.total_valid_purchased, hours("160"));
    assert_eq!(p3.total_valid_purchased, hours("210"));
    assert_eq!(
        engine.rollover_status(&p1.id).await.unwrap(),
        RolloverStatus::Applied
    );
    assert_eq!(
        engine.rollover_status(&p2.id).await.unwrap(),
        RolloverStatus::Applied
    );
    assert_eq!(
        engine.rollover_status(&p3.id).await.unwrap(),
        RolloverStatus::Pending
    );

    // Granted accumulates base hours only.
    let balance = engine.balance(&member_id).await.unwrap();
    assert_eq!(balance.granted, hours("210"));
}

#[tokio::test]
async fn rollover_uses_cumulative_used_hours() {
    // The rollover formula subtracts the member's lifetime used total from
    // the predecessor's total_valid_purchased, rather than tracking usage per
    // purchase. This test pins that documented behavior.
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("100"), "admin")
                .purchased_at(ts("2025-01-01")),
        )
        .await
        .unwrap();
    engine
        .adjust_balance(AdjustBalanceCmd::new(
            &member_id,
            hours("80"),
            "migrated usage",
            "admin",
        ))
        .await
        .unwrap();

    let p2 = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2025-06-01")),
        )
        .await
        .unwrap();
    // 100 - 80 lifetime used = 20 carried.
    assert_eq!(p2.total_valid_purchased, hours("80"));

    // The 80 used hours predate p2 entirely, yet they still count against it.
    let p3 = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("40"), "admin")
                .purchased_at(ts("2025-07-01")),
        )
        .await
        .unwrap();
    assert_eq!(p3.total_valid_purchased, hours("40"));
    assert_eq!(
        engine.rollover_status(&p2.id).await.unwrap(),
        RolloverStatus::Applied
    );
}

#[tokio::test]
async fn backdated_purchase_is_rejected() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2026-01-01")),
        )
        .await
        .unwrap();

    let backdated = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2025-12-31")),
        )
        .await
        .unwrap_err();
    assert!(matches!(backdated, EngineError::InvalidPurchaseOrder(_)));

    // Equal timestamps do not order the history either.
    let duplicate = engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2026-01-01")),
        )
        .await
        .unwrap_err();
    assert!(matches!(duplicate, EngineError::InvalidPurchaseOrder(_)));
}

#[tokio::test]
async fn session_consumes_elapsed_hours() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(Utc::now() - Days::new(1)),
        )
        .await
        .unwrap();

    // 14:00 to 16:30 consumes exactly 2.50h.
    let started_at = Utc::now() - TimeDelta::minutes(150);
    let session = engine
        .start_session(
            StartSessionCmd::new(&member_id, &branch_id, "T1", "Catan", "admin")
                .started_at(started_at),
        )
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Active);

    let ended = engine
        .end_session(
            &session.id,
            EndSession::At(started_at + TimeDelta::minutes(150)),
        )
        .await
        .unwrap();
    assert_eq!(ended.status, SessionStatus::Completed);
    assert_eq!(ended.hours_consumed, hours("2.5"));

    let balance = engine.balance(&member_id).await.unwrap();
    assert_eq!(balance.balance, hours("57.5"));
}

#[tokio::test]
async fn void_restores_balance_exactly() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(Utc::now() - Days::new(1)),
        )
        .await
        .unwrap();

    let session = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap();
    engine
        .end_session(&session.id, EndSession::Manual(hours("2.5")))
        .await
        .unwrap();
    assert_eq!(
        engine.balance(&member_id).await.unwrap().balance,
        hours("57.5")
    );

    let voided = engine.void_session(&session.id).await.unwrap();
    assert_eq!(voided.status, SessionStatus::Voided);
    assert_eq!(
        engine.balance(&member_id).await.unwrap().balance,
        hours("60")
    );

    // A second void would double-refund; it must be rejected.
    let again = engine.void_session(&session.id).await.unwrap_err();
    assert!(matches!(again, EngineError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn voiding_an_active_session_is_rejected() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("60"), "admin"))
        .await
        .unwrap();

    let session = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap();

    let err = engine.void_session(&session.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn cancelled_session_charges_nothing() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("60"), "admin"))
        .await
        .unwrap();

    let session = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap();
    let cancelled = engine.cancel_session(&session.id).await.unwrap();
    assert_eq!(cancelled.status, SessionStatus::Cancelled);
    assert_eq!(cancelled.hours_consumed, Hours::ZERO);
    assert_eq!(
        engine.balance(&member_id).await.unwrap().balance,
        hours("60")
    );

    // Cancelled is terminal: it cannot be ended or voided afterwards.
    let end = engine
        .end_session(&session.id, EndSession::Manual(hours("1")))
        .await
        .unwrap_err();
    assert!(matches!(end, EngineError::InvalidStateTransition(_)));
    let void = engine.void_session(&session.id).await.unwrap_err();
    assert!(matches!(void, EngineError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn manual_end_never_precedes_the_start() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("60"), "admin"))
        .await
        .unwrap();

    // A table booked for tomorrow, settled up front with manual hours.
    let session = engine
        .start_session(
            StartSessionCmd::new(&member_id, &branch_id, "T1", "Catan", "admin")
                .started_at(Utc::now() + Days::new(1)),
        )
        .await
        .unwrap();
    let ended = engine
        .end_session(&session.id, EndSession::Manual(hours("2")))
        .await
        .unwrap();

    assert!(ended.ended_at.unwrap() >= ended.started_at);
    assert_eq!(ended.hours_consumed, hours("2"));
    assert_eq!(
        engine.balance(&member_id).await.unwrap().balance,
        hours("58")
    );
}

#[tokio::test]
async fn ending_a_session_may_push_balance_negative() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("1"), "admin"))
        .await
        .unwrap();

    let session = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap();
    engine
        .end_session(&session.id, EndSession::Manual(hours("5")))
        .await
        .unwrap();

    let balance = engine.balance(&member_id).await.unwrap();
    assert_eq!(balance.balance, hours("-4"));
}

#[tokio::test]
async fn one_active_session_per_member() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("60"), "admin"))
        .await
        .unwrap();

    engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap();
    let err = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T2", "Chess", "admin",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn start_policy_blocks_empty_balance_and_expired_plan() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;

    // No purchase at all: balance is zero.
    let err = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Positive balance but the plan expired long ago.
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(ts("2024-01-01")),
        )
        .await
        .unwrap();
    let err = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn start_policy_checks_can_be_disabled() {
    let engine = new_engine_with_policy(StartPolicy {
        require_positive_balance: false,
        block_expired_plan: false,
    })
    .await;
    let (member_id, branch_id) = member_with_branch(&engine).await;

    // Zero balance and no plan, yet the session starts.
    let session = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Active);
}

#[tokio::test]
async fn adjustment_writes_exactly_one_audit_row() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    engine
        .adjust_balance(AdjustBalanceCmd::new(
            &member_id,
            hours("-10"),
            "goodwill credit",
            "admin",
        ))
        .await
        .unwrap();
    assert_eq!(
        engine.balance(&member_id).await.unwrap().balance,
        hours("10")
    );

    // A zero delta is a legitimate audit marker and still writes a row.
    engine
        .adjust_balance(AdjustBalanceCmd::new(
            &member_id,
            Hours::ZERO,
            "reviewed, no change",
            "admin",
        ))
        .await
        .unwrap();

    // A blank reason is rejected and writes nothing.
    let err = engine
        .adjust_balance(AdjustBalanceCmd::new(&member_id, hours("1"), "  ", "admin"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let (rows, total) = engine.member_adjustments(&member_id, 1, 50).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].delta, hours("-10"));
}

#[tokio::test]
async fn oversized_adjustment_is_rejected() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    engine
        .adjust_balance(AdjustBalanceCmd::new(
            &member_id,
            hours("1"),
            "migrated usage",
            "admin",
        ))
        .await
        .unwrap();

    // Would wrap the used-hours counter past i64::MAX.
    let err = engine
        .adjust_balance(AdjustBalanceCmd::new(
            &member_id,
            Hours::new(i64::MAX),
            "stress entry",
            "admin",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // The rejected adjustment left no audit row and no balance change.
    let (_, total) = engine.member_adjustments(&member_id, 1, 50).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(engine.balance(&member_id).await.unwrap().used, hours("1"));
}

#[tokio::test]
async fn balance_reads_are_idempotent() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;
    engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("60"), "admin"))
        .await
        .unwrap();

    let first = engine.balance(&member_id).await.unwrap();
    let second = engine.balance(&member_id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn expiring_soon_window_is_inclusive() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    // Purchased 350 days ago: expires in 15 days.
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&member_id, hours("60"), "admin")
                .purchased_at(Utc::now() - Days::new(350)),
        )
        .await
        .unwrap();

    let soon = engine.members_expiring_soon(30).await.unwrap();
    assert_eq!(soon.len(), 1);
    assert_eq!(soon[0].member.id, member_id);
    assert_eq!(soon[0].days_left, 15);

    let narrow = engine.members_expiring_soon(10).await.unwrap();
    assert!(narrow.is_empty());
}

#[tokio::test]
async fn oversized_expiry_window_is_rejected() {
    let engine = new_engine().await;

    // A window that runs past chrono's date range must error, not panic.
    let err = engine
        .members_expiring_soon(1_000_000_000_000)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn duplicate_mobile_is_rejected_across_formats() {
    let engine = new_engine().await;
    engine
        .create_member(CreateMemberCmd::new("Ana Cruz", "09171234567"))
        .await
        .unwrap();

    // Same number in international format.
    let err = engine
        .create_member(CreateMemberCmd::new("Impostor", "+63 917 123 4567"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let found = engine.member_by_mobile("+639171234567").await.unwrap();
    assert_eq!(found.full_name, "Ana Cruz");
    assert_eq!(found.mobile, "9171234567");
}

#[tokio::test]
async fn update_member_patches_only_set_fields() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    let updated = engine
        .update_member(
            &member_id,
            UpdateMemberCmd {
                email: Some("ana@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.full_name, "Ana Cruz");
    assert_eq!(updated.email.as_deref(), Some("ana@example.com"));
    assert_eq!(updated.mobile, "9171234567");

    // Switching to a mobile another member holds is rejected.
    engine
        .create_member(CreateMemberCmd::new("Ben Reyes", "09180000000"))
        .await
        .unwrap();
    let err = engine
        .update_member(
            &member_id,
            UpdateMemberCmd {
                mobile: Some("09180000000".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn search_members_filters_and_paginates() {
    let engine = new_engine().await;
    let branch = engine.create_branch("Makati", None).await.unwrap();
    engine
        .create_member(CreateMemberCmd::new("Ana Cruz", "09171234567").branch_id(&branch.id))
        .await
        .unwrap();
    engine
        .create_member(CreateMemberCmd::new("Ben Reyes", "09180000000"))
        .await
        .unwrap();

    let (by_name, total) = engine
        .search_members(
            &MemberSearchFilter {
                search: Some("cruz".to_string()),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(by_name[0].full_name, "Ana Cruz");

    // Digit searches normalize like mobile numbers do.
    let (by_mobile, _) = engine
        .search_members(
            &MemberSearchFilter {
                search: Some("0917123".to_string()),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(by_mobile.len(), 1);
    assert_eq!(by_mobile[0].mobile, "9171234567");

    let (in_branch, total) = engine
        .search_members(
            &MemberSearchFilter {
                branch_id: Some(branch.id.clone()),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(in_branch[0].full_name, "Ana Cruz");
}

#[tokio::test]
async fn search_members_by_expiry_state() {
    let engine = new_engine().await;
    let expired = engine
        .create_member(CreateMemberCmd::new("Old Plan", "09170000001"))
        .await
        .unwrap();
    let active = engine
        .create_member(CreateMemberCmd::new("Fresh Plan", "09170000002"))
        .await
        .unwrap();
    let no_plan = engine
        .create_member(CreateMemberCmd::new("No Plan", "09170000003"))
        .await
        .unwrap();

    engine
        .record_purchase(
            RecordPurchaseCmd::new(&expired.id, hours("60"), "admin")
                .purchased_at(ts("2024-01-01")),
        )
        .await
        .unwrap();
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&active.id, hours("60"), "admin")
                .purchased_at(Utc::now() - Days::new(1)),
        )
        .await
        .unwrap();

    let (expired_members, _) = engine
        .search_members(
            &MemberSearchFilter {
                is_expired: Some(true),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(expired_members.len(), 1);
    assert_eq!(expired_members[0].id, expired.id);

    // A member with no purchase counts as not expired.
    let (current, _) = engine
        .search_members(
            &MemberSearchFilter {
                is_expired: Some(false),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    let ids: Vec<&str> = current.iter().map(|m| m.id.as_str()).collect();
    assert!(ids.contains(&active.id.as_str()));
    assert!(ids.contains(&no_plan.id.as_str()));
    assert!(!ids.contains(&expired.id.as_str()));
}

#[tokio::test]
async fn member_purchases_paginate_newest_first() {
    let engine = new_engine().await;
    let (member_id, _) = member_with_branch(&engine).await;

    for day in ["2026-05-01", "2026-05-02", "2026-05-03"] {
        engine
            .record_purchase(
                RecordPurchaseCmd::new(&member_id, hours("10"), "admin").purchased_at(ts(day)),
            )
            .await
            .unwrap();
    }

    let (page, total) = engine.member_purchases(&member_id, 1, 2).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].purchase_date, ts("2026-05-03"));
    assert_eq!(page[1].purchase_date, ts("2026-05-02"));

    let (rest, _) = engine.member_purchases(&member_id, 2, 2).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].purchase_date, ts("2026-05-01"));
}

#[tokio::test]
async fn delete_member_removes_history() {
    let engine = new_engine().await;
    let (member_id, branch_id) = member_with_branch(&engine).await;
    engine
        .record_purchase(RecordPurchaseCmd::new(&member_id, hours("60"), "admin"))
        .await
        .unwrap();
    let session = engine
        .start_session(StartSessionCmd::new(
            &member_id, &branch_id, "T1", "Catan", "admin",
        ))
        .await
        .unwrap();

    engine.delete_member(&member_id).await.unwrap();

    let err = engine.member(&member_id).await.unwrap_err();
    assert!(matches!(err, EngineError::MemberNotFound(_)));
    let err = engine.session(&session.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn dashboard_stats_count_by_branch() {
    let engine = new_engine().await;
    let branch = engine.create_branch("Makati", None).await.unwrap();
    let in_branch = engine
        .create_member(CreateMemberCmd::new("Ana Cruz", "09170000001").branch_id(&branch.id))
        .await
        .unwrap();
    let elsewhere = engine
        .create_member(CreateMemberCmd::new("Ben Reyes", "09170000002"))
        .await
        .unwrap();

    // Ana renewed recently (her first purchase rolled over); Ben's plan is
    // long expired.
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&in_branch.id, hours("100"), "admin")
                .purchased_at(Utc::now() - Days::new(10)),
        )
        .await
        .unwrap();
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&in_branch.id, hours("60"), "admin")
                .purchased_at(Utc::now() - Days::new(1)),
        )
        .await
        .unwrap();
    engine
        .record_purchase(
            RecordPurchaseCmd::new(&elsewhere.id, hours("50"), "admin")
                .purchased_at(ts("2024-01-01")),
        )
        .await
        .unwrap();
    engine
        .start_session(StartSessionCmd::new(
            &in_branch.id,
            &branch.id,
            "T1",
            "Catan",
            "admin",
        ))
        .await
        .unwrap();

    let stats = engine.dashboard_stats(None).await.unwrap();
    assert_eq!(stats.total_members, 2);
    assert_eq!(stats.expired_members, 1);
    assert_eq!(stats.active_members, 1);
    assert_eq!(stats.active_sessions, 1);
    assert_eq!(stats.pending_rollovers, 1);
    assert_eq!(stats.total_hours_granted, hours("210"));
    assert_eq!(stats.total_balance, hours("210"));

    let scoped = engine.dashboard_stats(Some(&branch.id)).await.unwrap();
    assert_eq!(scoped.total_members, 1);
    assert_eq!(scoped.expired_members, 0);
    assert_eq!(scoped.total_hours_granted, hours("160"));
}
