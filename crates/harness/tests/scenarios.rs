use schedule_core::{
    evaluation::ConstraintKind,
    ids::*,
    operations::Operation,
    preview::PreviewStatus,
    time::Weekday,
};
use schedule_engine::{check, EngineError};
use schedule_harness::{init_tracing, TestStore};

// ============================================================================
// Scenario A: first shift for an employee
// ============================================================================

#[test]
fn scenario_a_first_assignment_diff() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 960)?;
    let shift = store.add_shift(Weekday::Wed, (9, 0), (17, 0), "Cashier")?;

    let preview = store.propose(vec![Operation::assign(erin, shift, "new hire")])?;
    let evaluation = &preview.evaluations[0];
    assert!(evaluation.result.blockers.is_empty());
    assert!(evaluation.result.warnings.len() <= 1);

    let impact = evaluation.diff.impact_for(erin).unwrap();
    assert_eq!(impact.before.weekly_minutes, 0);
    assert_eq!(impact.after.weekly_minutes, 480);
    assert_eq!(impact.delta.weekly_minutes, 480);
    assert_eq!(evaluation.diff.cells[0].after_label, "Erin 09:00-17:00");
    Ok(())
}

// ============================================================================
// Scenario B: overlapping shift is blocked
// ============================================================================

#[test]
fn scenario_b_overlap_blocks_apply() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 2400)?;
    let day = store.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let evening = store.add_shift(Weekday::Mon, (14, 0), (22, 0), "Cashier")?;
    store.seed_assignment(erin, day)?;

    let preview = store.propose(vec![Operation::assign(erin, evening, "")])?;
    assert!(preview.evaluations[0].result.has_blocker(ConstraintKind::Overlap));

    let result = store.engine.apply(preview.preview_id);
    match result {
        Err(EngineError::ConstraintViolation { blockers }) => {
            assert!(!blockers.is_empty());
            assert!(blockers.iter().any(|b| b.contains("overlaps")));
        }
        other => panic!("expected constraint violation, got {other:?}"),
    }
    assert_eq!(
        store.engine.get_preview(preview.preview_id)?.unwrap().status,
        PreviewStatus::Pending
    );
    assert_eq!(store.bindings()?, vec![(day, erin)]);
    Ok(())
}

// ============================================================================
// Scenario C: stale version is rejected at apply
// ============================================================================

#[test]
fn scenario_c_stale_preview_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 2400)?;
    let finn = store.add_employee("Finn", 2400)?;
    let mon = store.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let tue = store.add_shift(Weekday::Tue, (8, 0), (16, 0), "Cashier")?;
    let v1 = store.version()?;

    let first = store.propose(vec![Operation::assign(erin, mon, "")])?;
    let outcome = store.engine.apply(first.preview_id)?;
    assert_eq!(outcome.new_version, Version::new(2));

    let stale = store.propose_at(vec![Operation::assign(finn, tue, "")], v1)?;
    assert_eq!(stale.expected_version, v1);
    assert_eq!(stale.evaluated_version, Version::new(2));
    let before = store.bindings()?;

    let result = store.engine.apply(stale.preview_id);
    assert!(matches!(
        result,
        Err(EngineError::VersionMismatch { expected, current })
            if expected == v1 && current == Version::new(2)
    ));
    assert_eq!(store.bindings()?, before);
    assert_eq!(store.version()?, Version::new(2));
    Ok(())
}

#[test]
fn blocked_preview_reports_violation_even_when_stale() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 2400)?;
    let mon = store.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;

    let blocked = store.propose_at(
        vec![Operation::assign(erin, mon, ""), Operation::assign(erin, mon, "")],
        Version::new(7),
    )?;
    assert!(blocked.evaluations[1].result.has_blocker(ConstraintKind::DoubleBooking));
    let result = store.engine.apply(blocked.preview_id);
    assert!(matches!(result, Err(EngineError::ConstraintViolation { .. })));
    Ok(())
}

#[test]
fn preview_naming_a_future_version_never_applies() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 2400)?;
    let early = store.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let late = store.add_shift(Weekday::Mon, (14, 0), (22, 0), "Cashier")?;

    // Clean against v1, but names v2 as the version to apply on.
    let ahead = store.propose_at(vec![Operation::assign(erin, late, "")], Version::new(2))?;
    assert!(!ahead.is_blocked());
    assert_eq!(ahead.evaluated_version, Version::INITIAL);

    let first = store.propose(vec![Operation::assign(erin, early, "")])?;
    store.engine.apply(first.preview_id)?;
    assert_eq!(store.version()?, Version::new(2));

    let result = store.engine.apply(ahead.preview_id);
    assert!(matches!(
        result,
        Err(EngineError::VersionMismatch { expected, current })
            if expected == Version::INITIAL && current == Version::new(2)
    ));
    assert_eq!(store.bindings()?, vec![(early, erin)]);
    assert_eq!(store.version()?, Version::new(2));
    assert_eq!(
        store.engine.get_preview(ahead.preview_id)?.unwrap().status,
        PreviewStatus::Pending
    );
    Ok(())
}

// ============================================================================
// Scenario D: swap and undo
// ============================================================================

#[test]
fn scenario_d_swap_undo_restores_holders() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 2400)?;
    let finn = store.add_employee("Finn", 2400)?;
    let mon = store.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let thu = store.add_shift(Weekday::Thu, (12, 0), (20, 0), "Cashier")?;
    let a1 = store.seed_assignment(erin, mon)?;
    let a2 = store.seed_assignment(finn, thu)?;

    let preview = store.propose(vec![Operation::swap(a1, a2, erin, finn, "trade")])?;
    assert!(!preview.is_blocked());
    assert_eq!(preview.evaluations[0].diff.cells.len(), 2);

    store.engine.apply(preview.preview_id)?;
    let swapped = store.snapshot()?;
    assert_eq!(swapped.assignment(a1).unwrap().employee_id, finn);
    assert_eq!(swapped.assignment(a2).unwrap().employee_id, erin);

    store.engine.undo(preview.preview_id)?;
    let restored = store.snapshot()?;
    assert_eq!(restored.assignment(a1).unwrap().employee_id, erin);
    assert_eq!(restored.assignment(a1).unwrap().shift_id, mon);
    assert_eq!(restored.assignment(a2).unwrap().employee_id, finn);
    assert_eq!(restored.assignment(a2).unwrap().shift_id, thu);
    assert_eq!(store.version()?, Version::new(3));
    Ok(())
}

// ============================================================================
// Scenario E: weekly ceilings only fire on growth
// ============================================================================

/// Erin at 2500 of 2400 target minutes, five 500-minute weekday shifts.
struct OverTarget {
    store: TestStore,
    erin: EmployeeId,
    finn: EmployeeId,
    friday: AssignmentId,
    finn_saturday: AssignmentId,
}

fn over_target() -> Result<OverTarget, Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 2400)?;
    let finn = store.add_employee("Finn", 2400)?;
    let mut friday = None;
    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
        let shift = store.add_shift(day, (8, 0), (16, 20), "Cashier")?;
        let assignment = store.seed_assignment(erin, shift)?;
        if day == Weekday::Fri {
            friday = Some(assignment);
        }
    }
    let saturday = store.add_shift(Weekday::Sat, (8, 0), (16, 20), "Cashier")?;
    let finn_saturday = store.seed_assignment(finn, saturday)?;
    assert_eq!(store.snapshot()?.weekly_minutes(erin), 2500);
    Ok(OverTarget {
        store,
        erin,
        finn,
        friday: friday.ok_or("friday shift not seeded")?,
        finn_saturday,
    })
}

#[test]
fn scenario_e_same_total_has_no_warning() -> Result<(), Box<dyn std::error::Error>> {
    let OverTarget {
        mut store,
        erin,
        finn,
        friday,
        finn_saturday,
    } = over_target()?;

    let preview = store.propose(vec![Operation::swap(friday, finn_saturday, erin, finn, "")])?;
    let evaluation = &preview.evaluations[0];
    assert!(evaluation.result.blockers.is_empty());
    assert!(evaluation.result.warnings.is_empty(), "{:?}", evaluation.result.warnings);
    assert_eq!(evaluation.diff.impact_for(erin).unwrap().delta.weekly_minutes, 0);
    Ok(())
}

#[test]
fn scenario_e_growth_to_108_percent_warns() -> Result<(), Box<dyn std::error::Error>> {
    let OverTarget { mut store, erin, .. } = over_target()?;
    let short = store.add_shift(Weekday::Sat, (10, 0), (11, 40), "Cashier")?;

    let preview = store.propose(vec![Operation::assign(erin, short, "")])?;
    let result = &preview.evaluations[0].result;
    assert!(result.blockers.is_empty(), "{:?}", result.blockers);
    assert!(result.has_warning(ConstraintKind::WeeklySoftCeiling));
    assert_eq!(preview.evaluations[0].diff.impact_for(erin).unwrap().after.weekly_minutes, 2600);
    Ok(())
}

#[test]
fn scenario_e_growth_to_129_percent_blocks() -> Result<(), Box<dyn std::error::Error>> {
    let OverTarget { mut store, erin, .. } = over_target()?;
    let long = store.add_shift(Weekday::Sat, (8, 0), (18, 0), "Cashier")?;

    let preview = store.propose(vec![Operation::assign(erin, long, "")])?;
    let result = &preview.evaluations[0].result;
    assert!(result.has_blocker(ConstraintKind::WeeklyHardCeiling));
    assert!(!result.has_warning(ConstraintKind::WeeklySoftCeiling));
    assert_eq!(preview.evaluations[0].diff.impact_for(erin).unwrap().after.weekly_minutes, 3100);
    assert!(matches!(
        store.engine.apply(preview.preview_id),
        Err(EngineError::ConstraintViolation { .. })
    ));
    Ok(())
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn check_is_pure_over_stored_snapshot() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 960)?;
    let mon = store.add_shift(Weekday::Mon, (8, 0), (16, 0), "Cashier")?;
    let snapshot = store.snapshot()?;
    let op = Operation::assign(erin, mon, "");

    let first = check(&snapshot, store.engine.policy(), &op);
    let second = check(&snapshot, store.engine.policy(), &op);
    assert_eq!(first, second);
    assert_eq!(store.snapshot()?, snapshot);
    Ok(())
}

#[test]
fn assign_round_trips_through_undo() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TestStore::new()?;
    let erin = store.add_employee("Erin", 2400)?;
    let finn = store.add_employee("Finn", 2400)?;
    let mut shifts = Vec::new();
    for day in [Weekday::Mon, Weekday::Wed, Weekday::Fri] {
        shifts.push(store.add_shift(day, (9, 0), (15, 0), "Cashier")?);
    }
    store.seed_assignment(finn, shifts[1])?;
    let before = store.snapshot()?.assignments;

    for shift in [shifts[0], shifts[2]] {
        let preview = store.propose(vec![Operation::assign(erin, shift, "")])?;
        store.engine.apply(preview.preview_id)?;
        store.engine.undo(preview.preview_id)?;
        assert_eq!(store.snapshot()?.assignments, before);
    }
    Ok(())
}
