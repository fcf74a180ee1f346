//! Audit report types

use serde::{Deserialize, Serialize};

/// Overall audit verdict
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Passed,
    Failed,
}

/// One rule's result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditCheck {
    /// Stable rule identifier
    pub rule: String,
    pub passed: bool,
    /// Human-readable explanation of what was counted or which orders
    /// violated the rule
    pub details: String,
}

impl AuditCheck {
    pub fn new(rule: &str, passed: bool, details: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            passed,
            details: details.into(),
        }
    }
}

/// Full audit report - the CLI's output object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub overall_status: AuditStatus,
    pub checks: Vec<AuditCheck>,
    /// Report timestamp (Unix milliseconds)
    pub timestamp: i64,
}

impl AuditReport {
    /// Build a report; overall status is Passed only if every check passed
    pub fn from_checks(checks: Vec<AuditCheck>, timestamp: i64) -> Self {
        let overall_status = if checks.iter().all(|c| c.passed) {
            AuditStatus::Passed
        } else {
            AuditStatus::Failed
        };
        Self {
            overall_status,
            checks,
            timestamp,
        }
    }

    pub fn passed(&self) -> bool {
        self.overall_status == AuditStatus::Passed
    }
}
