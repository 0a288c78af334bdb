use schedule_core::{ids::*, operations::Operation, preview::PreviewStatus, time::Weekday};
use schedule_engine::EngineError;
use schedule_harness::{init_tracing, TestDatabase};

// ============================================================================
// Two Engines on One Database (3 tests)
// ============================================================================

#[test]
fn first_apply_wins_across_handles() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let db = TestDatabase::new()?;
    let mut manager = db.open()?;
    let erin = manager.add_employee("Erin", 2400)?;
    let finn = manager.add_employee("Finn", 2400)?;
    let mon = manager.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let tue = manager.add_shift(Weekday::Tue, (8, 0), (16, 0), "Cashier")?;
    let mut supervisor = db.open()?;

    // Both propose against v1
    let first = manager.propose(vec![Operation::assign(erin, mon, "")])?;
    let second = supervisor.propose(vec![Operation::assign(finn, tue, "")])?;
    assert_eq!(first.expected_version, Version::INITIAL);
    assert_eq!(second.expected_version, Version::INITIAL);

    manager.engine.apply(first.preview_id)?;
    let result = supervisor.engine.apply(second.preview_id);
    assert!(matches!(
        result,
        Err(EngineError::VersionMismatch { current, .. }) if current == Version::new(2)
    ));

    assert_eq!(supervisor.bindings()?, vec![(mon, erin)]);
    assert_eq!(
        supervisor.engine.get_preview(second.preview_id)?.unwrap().status,
        PreviewStatus::Pending
    );
    Ok(())
}

#[test]
fn preview_applied_elsewhere_cannot_apply_again() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let mut left = db.open()?;
    let erin = left.add_employee("Erin", 2400)?;
    let mon = left.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let mut right = db.open()?;

    let preview = left.propose(vec![Operation::assign(erin, mon, "")])?;
    right.engine.apply(preview.preview_id)?;

    let again = left.engine.apply(preview.preview_id);
    assert!(matches!(
        again,
        Err(EngineError::InvalidState {
            status: PreviewStatus::Applied,
            ..
        })
    ));
    assert_eq!(left.version()?, Version::new(2));
    Ok(())
}

#[test]
fn reproposing_after_conflict_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let mut manager = db.open()?;
    let erin = manager.add_employee("Erin", 2400)?;
    let finn = manager.add_employee("Finn", 2400)?;
    let mon = manager.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let tue = manager.add_shift(Weekday::Tue, (8, 0), (16, 0), "Cashier")?;
    let mut supervisor = db.open()?;

    let winner = manager.propose(vec![Operation::assign(erin, mon, "")])?;
    let loser = supervisor.propose(vec![Operation::assign(finn, tue, "")])?;
    manager.engine.apply(winner.preview_id)?;
    assert!(supervisor.engine.apply(loser.preview_id).is_err());

    supervisor.engine.discard(loser.preview_id)?;
    let retry = supervisor.propose(loser.operations.clone())?;
    let outcome = supervisor.engine.apply(retry.preview_id)?;
    assert_eq!(outcome.new_version, Version::new(3));

    let mut expected = vec![(mon, erin), (tue, finn)];
    expected.sort();
    assert_eq!(manager.bindings()?, expected);
    Ok(())
}
