//! Replay of scripted editing sessions.
//!
//! A script is JSON lines, one [`SessionAction`] per line, e.g.
//! `{"op": "deleteProtocolMedicine", "idx": 0, "confirmed": true}`.
//! Destructive actions must carry `"confirmed": true`; blank lines and
//! lines starting with `#` are ignored.

use medrecon_core::{ReconcileError, ReconciliationSession, SessionAction};
use serde::Serialize;

use crate::{CatalogError, CatalogResult};

/// A script line that was not applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedStep {
    /// 1-based line number
    pub line: usize,
    pub reason: String,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    /// Refused by the engine
    pub rejected: Vec<SkippedStep>,
    /// Destructive steps without confirmation
    pub unconfirmed: Vec<SkippedStep>,
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub line: usize,
    pub confirmed: bool,
    pub action: SessionAction,
}

/// Parse a JSON-lines script.
pub fn parse_script(script: &str) -> CatalogResult<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (i, raw) in script.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(trimmed)?;
        let confirmed = value
            .get("confirmed")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let action: SessionAction = serde_json::from_value(value).map_err(|e| {
            CatalogError::InvalidFormat(format!("line {}: {}", i + 1, e))
        })?;
        steps.push(ScriptStep {
            line: i + 1,
            confirmed,
            action,
        });
    }
    Ok(steps)
}

/// Apply steps in order. Engine rejections are recorded and replay continues.
pub fn replay(session: &mut ReconciliationSession, steps: Vec<ScriptStep>) -> ReplayReport {
    let mut report = ReplayReport::default();
    for step in steps {
        if step.action.is_destructive() && !step.confirmed {
            tracing::warn!(line = step.line, "Skipping unconfirmed destructive step");
            report.unconfirmed.push(SkippedStep {
                line: step.line,
                reason: "destructive action requires confirmation".into(),
            });
            continue;
        }
        match session.apply(step.action) {
            Ok(()) => report.applied += 1,
            Err(e) => report.rejected.push(SkippedStep {
                line: step.line,
                reason: describe(&e),
            }),
        }
    }
    tracing::info!(
        session = %session.id(),
        applied = report.applied,
        rejected = report.rejected.len(),
        unconfirmed = report.unconfirmed.len(),
        "Replay finished"
    );
    report
}

fn describe(error: &ReconcileError) -> String {
    match error {
        ReconcileError::Validation(fields) => format!("invalid fields: {}", fields),
        other => other.to_string(),
    }
}
