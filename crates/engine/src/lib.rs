pub mod constraints;
pub mod diff;
pub mod error;
pub mod inverse;

#[cfg(test)]
mod testing;

pub use constraints::check;
pub use diff::diff;
pub use error::EngineError;
pub use inverse::invert;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use schedule_core::{
    ids::*,
    operations::Operation,
    policy::SchedulingPolicy,
    preview::{operations_checksum, DiscardReason, OperationEvaluation, Preview, PreviewStatus},
    schedule::{AppliedChange, ScheduleSnapshot},
    time::{Clock, SystemClock},
};
use schedule_storage::{PreviewStore, ScheduleWriter, SnapshotProvider, SqliteStorage};

/// Result of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub new_version: Version,
}

/// Result of a successful undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoOutcome {
    pub reverted_operations: usize,
    pub new_version: Version,
}

/// Check and diff a batch, each operation against the state left by the
/// structurally valid operations before it.
pub fn evaluate_batch(
    snapshot: &ScheduleSnapshot,
    policy: &SchedulingPolicy,
    operations: &[Operation],
) -> Result<Vec<OperationEvaluation>, EngineError> {
    let mut working = snapshot.clone();
    let mut evaluations = Vec::with_capacity(operations.len());
    for (index, op) in operations.iter().enumerate() {
        let result = check(&working, policy, op);
        let changes = diff(&working, op);
        debug!(
            index,
            op = op.op_type_name(),
            blockers = result.blockers.len(),
            warnings = result.warnings.len(),
            "evaluated operation"
        );
        if !constraints::check_structure(&working, op).is_blocked() {
            working.apply(op, AssignmentId::new())?;
        }
        evaluations.push(OperationEvaluation {
            result,
            diff: changes,
        });
    }
    Ok(evaluations)
}

/// Mirror an in-memory change onto the open transaction.
fn write_change<W: ScheduleWriter>(writer: &mut W, change: &AppliedChange) -> Result<(), EngineError> {
    match change {
        AppliedChange::Assigned(a) => {
            writer.create_assignment(a.assignment_id, a.shift_id, a.employee_id)?;
        }
        AppliedChange::Unassigned(a) => {
            writer.delete_assignment(a.assignment_id)?;
        }
        AppliedChange::Swapped { first, second } => {
            writer.reassign_assignment(first.assignment_id, first.employee_id, second.employee_id)?;
            writer.reassign_assignment(second.assignment_id, second.employee_id, first.employee_id)?;
        }
    }
    Ok(())
}

pub struct Engine {
    storage: SqliteStorage,
    policy: SchedulingPolicy,
    clock: Box<dyn Clock>,
}

impl Engine {
    pub fn new(storage: SqliteStorage) -> Self {
        Self {
            storage,
            policy: SchedulingPolicy::default(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_policy(storage: SqliteStorage, policy: SchedulingPolicy) -> Result<Self, EngineError> {
        policy.validate()?;
        Ok(Self {
            policy,
            ..Self::new(storage)
        })
    }

    /// Replace the wall clock used for preview timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut SqliteStorage {
        &mut self.storage
    }

    pub fn current_version(&self, store_id: StoreId, week_id: WeekId) -> Result<Version, EngineError> {
        Ok(self.storage.current_version(store_id, week_id)?)
    }

    pub fn snapshot(&self, store_id: StoreId, week_id: WeekId) -> Result<ScheduleSnapshot, EngineError> {
        Ok(self.storage.snapshot(store_id, week_id)?)
    }

    // ========================================================================
    // Preview lifecycle
    // ========================================================================

    /// Evaluate a batch and store it as a pending preview. Blocked previews
    /// are stored too so the caller can show why.
    pub fn propose(
        &mut self,
        store_id: StoreId,
        week_id: WeekId,
        operations: Vec<Operation>,
        expected_version: Version,
    ) -> Result<Preview, EngineError> {
        if operations.is_empty() {
            return Err(EngineError::InvalidRequest("preview has no operations".into()));
        }

        let snapshot = self.storage.snapshot(store_id, week_id)?;
        let evaluations = evaluate_batch(&snapshot, &self.policy, &operations)?;
        let now = self.clock.now();

        let preview = Preview {
            preview_id: PreviewId::new(),
            store_id,
            week_id,
            checksum: operations_checksum(&operations)?,
            operations,
            evaluations,
            expected_version,
            evaluated_version: snapshot.version,
            status: PreviewStatus::Pending,
            created_at: now,
            expires_at: now + self.policy.preview_ttl(),
            inverse_operations: Vec::new(),
            applied_version: None,
            undone_version: None,
            discard_reason: None,
        };
        self.storage.insert_preview(&preview)?;

        if expected_version != snapshot.version {
            warn!(
                preview_id = %preview.preview_id,
                expected = %expected_version,
                current = %snapshot.version,
                "preview proposed against a stale version"
            );
        }
        info!(
            preview_id = %preview.preview_id,
            store_id = %store_id,
            week_id = %week_id,
            operations = preview.operations.len(),
            blocked = preview.is_blocked(),
            "preview proposed"
        );
        Ok(preview)
    }

    pub fn get_preview(&mut self, preview_id: PreviewId) -> Result<Option<Preview>, EngineError> {
        let now = self.clock.now();
        match self.storage.get_preview(preview_id)? {
            Some(preview) => Ok(Some(self.expire_if_due(preview, now)?)),
            None => Ok(None),
        }
    }

    /// Previews of one schedule week, newest first.
    pub fn list_previews(&mut self, store_id: StoreId, week_id: WeekId) -> Result<Vec<Preview>, EngineError> {
        let now = self.clock.now();
        self.storage
            .list_previews(store_id, week_id)?
            .into_iter()
            .map(|preview| self.expire_if_due(preview, now))
            .collect()
    }

    /// Commit a pending preview in one transaction and advance the version.
    pub fn apply(&mut self, preview_id: PreviewId) -> Result<ApplyOutcome, EngineError> {
        let mut preview = self.load_preview(preview_id)?;
        match preview.status {
            PreviewStatus::Pending => {}
            PreviewStatus::Discarded if preview.discard_reason == Some(DiscardReason::Expired) => {
                warn!(preview_id = %preview_id, "apply rejected: preview expired");
                return Err(EngineError::ExpiredPreview(preview_id));
            }
            status => {
                warn!(preview_id = %preview_id, status = status.as_str(), "apply rejected");
                return Err(EngineError::InvalidState {
                    preview: preview_id,
                    status,
                });
            }
        }

        if preview.is_blocked() {
            let blockers = preview.blocker_messages();
            warn!(preview_id = %preview_id, blockers = blockers.len(), "apply rejected: blocked");
            return Err(EngineError::ConstraintViolation { blockers });
        }

        let store_id = preview.store_id;
        let week_id = preview.week_id;
        let expected = preview.expected_version;

        let mut tx = self.storage.transaction()?;
        let fresh = tx
            .get_preview(preview_id)?
            .ok_or_else(|| EngineError::NotFound(format!("preview {preview_id}")))?;
        if fresh.status != PreviewStatus::Pending {
            return Err(EngineError::InvalidState {
                preview: preview_id,
                status: fresh.status,
            });
        }

        let current = tx.current_version(store_id, week_id)?;
        if current != expected {
            warn!(
                preview_id = %preview_id,
                expected = %expected,
                current = %current,
                "apply rejected: version mismatch"
            );
            return Err(EngineError::VersionMismatch { expected, current });
        }
        // A caller may name a version the schedule only reaches later; the
        // findings still describe the older state.
        if preview.evaluated_version != current {
            warn!(
                preview_id = %preview_id,
                evaluated = %preview.evaluated_version,
                current = %current,
                "apply rejected: evaluated against another version"
            );
            return Err(EngineError::VersionMismatch {
                expected: preview.evaluated_version,
                current,
            });
        }

        let mut working = tx.snapshot(store_id, week_id)?;
        let mut inverses = Vec::with_capacity(preview.operations.len());
        for op in &preview.operations {
            let pre = working.clone();
            let change = working.apply(op, AssignmentId::new())?;
            write_change(&mut tx, &change)?;
            inverses.push(invert(op, &pre, &change)?);
        }

        let new_version = tx
            .bump_schedule_version(store_id, week_id, expected)?;

        preview.status = PreviewStatus::Applied;
        preview.inverse_operations = inverses;
        preview.applied_version = Some(new_version);
        tx.update_preview(&preview)?;
        tx.commit()?;

        info!(
            preview_id = %preview_id,
            operations = preview.operations.len(),
            new_version = %new_version,
            "preview applied"
        );
        Ok(ApplyOutcome { new_version })
    }

    /// Replay the stored inverses of an applied preview, newest first.
    ///
    /// The checker does not run again: undo restores exactly the bindings
    /// this preview touched, even if later edits now overlap them. Storage
    /// still enforces capacity and uniqueness, and a violation rolls back.
    pub fn undo(&mut self, preview_id: PreviewId) -> Result<UndoOutcome, EngineError> {
        let mut preview = self.load_preview(preview_id)?;
        if preview.status != PreviewStatus::Applied {
            warn!(preview_id = %preview_id, status = preview.status.as_str(), "undo rejected");
            return Err(EngineError::InvalidState {
                preview: preview_id,
                status: preview.status,
            });
        }

        let store_id = preview.store_id;
        let week_id = preview.week_id;

        let mut tx = self.storage.transaction()?;
        let fresh = tx
            .get_preview(preview_id)?
            .ok_or_else(|| EngineError::NotFound(format!("preview {preview_id}")))?;
        if fresh.status != PreviewStatus::Applied {
            return Err(EngineError::InvalidState {
                preview: preview_id,
                status: fresh.status,
            });
        }

        let current = tx.current_version(store_id, week_id)?;
        let mut working = tx.snapshot(store_id, week_id)?;
        for op in preview.inverse_operations.iter().rev() {
            let change = working.apply(op, AssignmentId::new())?;
            write_change(&mut tx, &change)?;
        }

        let new_version = tx
            .bump_schedule_version(store_id, week_id, current)?;

        let reverted_operations = preview.inverse_operations.len();
        preview.status = PreviewStatus::Undone;
        preview.undone_version = Some(new_version);
        tx.update_preview(&preview)?;
        tx.commit()?;

        info!(
            preview_id = %preview_id,
            reverted_operations,
            new_version = %new_version,
            "preview undone"
        );
        Ok(UndoOutcome {
            reverted_operations,
            new_version,
        })
    }

    /// Drop a pending preview. Discarding twice is a no-op.
    pub fn discard(&mut self, preview_id: PreviewId) -> Result<(), EngineError> {
        let mut preview = self.load_preview(preview_id)?;
        match preview.status {
            PreviewStatus::Pending => {
                preview.status = PreviewStatus::Discarded;
                preview.discard_reason = Some(DiscardReason::Caller);
                self.storage.update_preview(&preview)?;
                info!(preview_id = %preview_id, "preview discarded");
                Ok(())
            }
            PreviewStatus::Discarded => {
                debug!(preview_id = %preview_id, "preview already discarded");
                Ok(())
            }
            status => {
                warn!(preview_id = %preview_id, status = status.as_str(), "discard rejected");
                Err(EngineError::InvalidState {
                    preview: preview_id,
                    status,
                })
            }
        }
    }

    /// Delete expired previews. Returns how many rows were removed.
    pub fn purge_expired(&mut self) -> Result<u64, EngineError> {
        let now = self.clock.now();
        let purged = self.storage.delete_expired_previews(now)?;
        info!(purged, "expired previews purged");
        Ok(purged)
    }

    fn load_preview(&mut self, preview_id: PreviewId) -> Result<Preview, EngineError> {
        self.get_preview(preview_id)?
            .ok_or_else(|| EngineError::NotFound(format!("preview {preview_id}")))
    }

    /// Mark a pending preview past its time box as discarded by expiry.
    fn expire_if_due(&mut self, mut preview: Preview, now: DateTime<Utc>) -> Result<Preview, EngineError> {
        if preview.is_expired(now) {
            preview.status = PreviewStatus::Discarded;
            preview.discard_reason = Some(DiscardReason::Expired);
            self.storage.update_preview(&preview)?;
            info!(preview_id = %preview.preview_id, "preview expired");
        }
        Ok(preview)
    }
}
