use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::evaluation::{ConstraintResult, Diff};
use crate::ids::*;
use crate::operations::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    Pending,
    Applied,
    Undone,
    Discarded,
}

impl PreviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Applied => "applied",
            Self::Undone => "undone",
            Self::Discarded => "discarded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "applied" => Ok(Self::Applied),
            "undone" => Ok(Self::Undone),
            "discarded" => Ok(Self::Discarded),
            _ => Err(CoreError::InvalidData(format!("unknown preview status: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    Caller,
    Expired,
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caller => "caller",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "caller" => Ok(Self::Caller),
            "expired" => Ok(Self::Expired),
            _ => Err(CoreError::InvalidData(format!("unknown discard reason: {s}"))),
        }
    }
}

/// Constraint result and diff for the operation at the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEvaluation {
    pub result: ConstraintResult,
    pub diff: Diff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub preview_id: PreviewId,
    pub store_id: StoreId,
    pub week_id: WeekId,
    pub operations: Vec<Operation>,
    pub evaluations: Vec<OperationEvaluation>,
    /// Version the caller expects to apply against.
    pub expected_version: Version,
    /// Version of the snapshot the evaluations were computed on.
    pub evaluated_version: Version,
    pub status: PreviewStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub checksum: [u8; 32],
    /// Inverse of each operation, index-aligned. Empty until applied.
    pub inverse_operations: Vec<Operation>,
    pub applied_version: Option<Version>,
    pub undone_version: Option<Version>,
    pub discard_reason: Option<DiscardReason>,
}

impl Preview {
    pub fn is_blocked(&self) -> bool {
        self.evaluations.iter().any(|e| e.result.is_blocked())
    }

    /// Every blocker message, prefixed with the index of its operation.
    pub fn blocker_messages(&self) -> Vec<String> {
        self.evaluations
            .iter()
            .enumerate()
            .flat_map(|(index, e)| {
                e.result
                    .blockers
                    .iter()
                    .map(move |v| format!("operation {index}: {}", v.message))
            })
            .collect()
    }

    /// A pending preview whose time box has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == PreviewStatus::Pending && now >= self.expires_at
    }

    pub fn verify_checksum(&self) -> Result<(), CoreError> {
        if operations_checksum(&self.operations)? != self.checksum {
            return Err(CoreError::InvalidData(format!(
                "checksum mismatch on preview {}",
                self.preview_id
            )));
        }
        Ok(())
    }
}

/// blake3 digest over the msgpack encoding of each operation, in order.
pub fn operations_checksum(operations: &[Operation]) -> Result<[u8; 32], CoreError> {
    let mut hasher = blake3::Hasher::new();
    for op in operations {
        hasher.update(&op.to_msgpack()?);
    }
    Ok(*hasher.finalize().as_bytes())
}

pub fn encode_operations(operations: &[Operation]) -> Result<Vec<u8>, CoreError> {
    rmp_serde::to_vec(operations).map_err(|e| CoreError::Serialization(e.to_string()))
}

pub fn decode_operations(bytes: &[u8]) -> Result<Vec<Operation>, CoreError> {
    rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
}

pub fn encode_evaluations(evaluations: &[OperationEvaluation]) -> Result<Vec<u8>, CoreError> {
    rmp_serde::to_vec(evaluations).map_err(|e| CoreError::Serialization(e.to_string()))
}

pub fn decode_evaluations(bytes: &[u8]) -> Result<Vec<OperationEvaluation>, CoreError> {
    rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
}
