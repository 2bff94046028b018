//! Append-only audit spool (§4.9). Grounded on the teacher's
//! `mqk-audit::AuditWriter` for the canonical-JSON-line discipline, adapted
//! to a per-day spool directory with temp-file + fsync + atomic rename
//! instead of a single long-lived open file, per the write sequence this
//! spec calls out explicitly.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::canonical_json_string;

/// Single-writer-per-process append-only sink. `spool_dir` holds one
/// subdirectory per UTC calendar day (`date=YYYYMMDD`); each write lands in
/// its own part file so concurrent writers never contend for the same
/// inode, and the upload stage can move whole parts without locking.
pub struct AuditSpool {
    spool_dir: PathBuf,
    upload_failures: u64,
}

/// Receipt for a completed spool write: where it landed and when. Distinct
/// from [`AuditRecord`], which is the audit *content* written to that path.
#[derive(Clone, Debug, PartialEq)]
pub struct SpoolWrite {
    pub path: PathBuf,
    pub ts_utc: DateTime<Utc>,
}

/// The spec's audit record content (§3, §6):
/// `{audit_id, ts_ns, actor, action, target_type, target_id, reason, metadata}`.
/// Every `AuditSpool::write_record` call persists one of these, never an ad
/// hoc JSON blob, so any consumer reading the spool can rely on the schema.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditRecord {
    pub audit_id: Uuid,
    pub ts_ns: i64,
    pub actor: String,
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub reason: Option<String>,
    pub metadata: Value,
}

impl AuditRecord {
    /// `ts_ns` is caller-supplied (not read from the wall clock here) so the
    /// record's timestamp always traces back to the same clock reading that
    /// drove the decision being audited.
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        target_type: impl Into<String>,
        target_id: impl Into<String>,
        reason: Option<String>,
        metadata: Value,
        ts_ns: i64,
    ) -> Self {
        Self {
            audit_id: Uuid::new_v4(),
            ts_ns,
            actor: actor.into(),
            action: action.into(),
            target_type: target_type.into(),
            target_id: target_id.into(),
            reason,
            metadata,
        }
    }

    /// On-disk shape per §6: `ts` is the nanosecond timestamp encoded as a
    /// string, `reason` serializes to JSON `null` when absent.
    pub fn to_json(&self) -> Value {
        json!({
            "audit_id": self.audit_id.to_string(),
            "ts": self.ts_ns.to_string(),
            "actor": self.actor,
            "action": self.action,
            "target_type": self.target_type,
            "target_id": self.target_id,
            "reason": self.reason,
            "metadata": self.metadata,
        })
    }

    fn partition_time(&self) -> DateTime<Utc> {
        let secs = self.ts_ns.div_euclid(1_000_000_000);
        let nanos = self.ts_ns.rem_euclid(1_000_000_000) as u32;
        DateTime::<Utc>::from_timestamp(secs, nanos).unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap())
    }
}

impl AuditSpool {
    pub fn new(spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            spool_dir: spool_dir.into(),
            upload_failures: 0,
        }
    }

    pub fn upload_failures(&self) -> u64 {
        self.upload_failures
    }

    /// Write `payload` as one canonical JSON line. Steps (§4.9): open a
    /// `.tmp` file, write + fsync, atomically rename into place. Never
    /// panics on a write failure — callers treat audit loss as degraded
    /// service, not a process-ending condition.
    pub fn write(&mut self, payload: &Value, now: DateTime<Utc>) -> Result<SpoolWrite> {
        let day_dir = self.spool_dir.join(format!("date={}", now.format("%Y%m%d")));
        fs::create_dir_all(&day_dir).with_context(|| format!("create_dir_all {day_dir:?}"))?;

        let ts_ns = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp() * 1_000_000_000);
        let uuid = Uuid::new_v4();
        let final_name = format!("part-{ts_ns}-{uuid}.jsonl");
        let tmp_name = format!("{final_name}.tmp");

        let tmp_path = day_dir.join(&tmp_name);
        let final_path = day_dir.join(&final_name);

        let line = canonical_json_string(payload);
        write_and_fsync(&tmp_path, &line)?;
        fs::rename(&tmp_path, &final_path).with_context(|| format!("rename {tmp_path:?} -> {final_path:?}"))?;

        Ok(SpoolWrite { path: final_path, ts_utc: now })
    }

    /// Typed entry point: serializes `record` to the spec's on-disk schema
    /// and writes it, partitioning by the record's own `ts_ns` rather than
    /// the wall clock so a replayed/backfilled record lands in the day
    /// directory it actually belongs to.
    pub fn write_record(&mut self, record: &AuditRecord) -> Result<SpoolWrite> {
        self.write(&record.to_json(), record.partition_time())
    }

    /// Best-effort object storage upload. Failures are logged and counted,
    /// never propagated: the write already succeeded on local disk.
    pub fn try_upload<F: FnOnce(&Path) -> Result<()>>(&mut self, record: &SpoolWrite, uploader: F) {
        if let Err(e) = uploader(&record.path) {
            self.upload_failures += 1;
            warn!(path = %record.path.display(), error = %e, "audit upload failed");
        }
    }
}

fn write_and_fsync(path: &Path, line: &str) -> Result<()> {
    let mut f: File = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("open {path:?}"))?;
    f.write_all(line.as_bytes()).context("write audit line")?;
    f.write_all(b"\n").context("write trailing newline")?;
    f.sync_all().context("fsync audit temp file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn write_lands_in_date_partitioned_dir_with_jsonl_content() {
        let dir = tempdir().unwrap();
        let mut spool = AuditSpool::new(dir.path());
        let now = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z").unwrap().with_timezone(&Utc);
        let record = spool.write(&json!({"b": 2, "a": 1}), now).unwrap();

        assert!(record.path.to_string_lossy().contains("date=20260102"));
        let content = fs::read_to_string(&record.path).unwrap();
        assert_eq!(content.trim(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn two_writes_in_the_same_nanosecond_never_collide() {
        let dir = tempdir().unwrap();
        let mut spool = AuditSpool::new(dir.path());
        let now = Utc::now();
        let r1 = spool.write(&json!({"n": 1}), now).unwrap();
        let r2 = spool.write(&json!({"n": 2}), now).unwrap();
        assert_ne!(r1.path, r2.path);
    }

    #[test]
    fn failed_upload_increments_counter_without_failing_the_caller() {
        let dir = tempdir().unwrap();
        let mut spool = AuditSpool::new(dir.path());
        let record = spool.write(&json!({"x": 1}), Utc::now()).unwrap();
        spool.try_upload(&record, |_| Err(anyhow::anyhow!("network down")));
        assert_eq!(spool.upload_failures(), 1);
    }

    #[test]
    fn successful_upload_does_not_increment_counter() {
        let dir = tempdir().unwrap();
        let mut spool = AuditSpool::new(dir.path());
        let record = spool.write(&json!({"x": 1}), Utc::now()).unwrap();
        spool.try_upload(&record, |_| Ok(()));
        assert_eq!(spool.upload_failures(), 0);
    }

    #[test]
    fn write_record_persists_the_mandated_schema() {
        let dir = tempdir().unwrap();
        let mut spool = AuditSpool::new(dir.path());
        let record = AuditRecord::new(
            "exd-bridge",
            "GATE_REFUSED",
            "bridge_id",
            "b1",
            Some("SYMBOL_NOT_ALLOWED".to_string()),
            json!({"symbol": "ETHUSDT"}),
            1_735_808_645_000_000_000,
        );
        let write = spool.write_record(&record).unwrap();
        let content = fs::read_to_string(&write.path).unwrap();
        let parsed: Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["audit_id"], Value::String(record.audit_id.to_string()));
        assert_eq!(parsed["ts"], Value::String("1735808645000000000".to_string()));
        assert_eq!(parsed["actor"], "exd-bridge");
        assert_eq!(parsed["action"], "GATE_REFUSED");
        assert_eq!(parsed["target_type"], "bridge_id");
        assert_eq!(parsed["target_id"], "b1");
        assert_eq!(parsed["reason"], "SYMBOL_NOT_ALLOWED");
        assert_eq!(parsed["metadata"]["symbol"], "ETHUSDT");
    }

    #[test]
    fn write_record_serializes_absent_reason_as_null() {
        let dir = tempdir().unwrap();
        let mut spool = AuditSpool::new(dir.path());
        let record = AuditRecord::new("exd-bridge", "SHADOW_RECORDED", "bridge_id", "b1", None, json!({}), 1_000_000_000);
        let write = spool.write_record(&record).unwrap();
        let content = fs::read_to_string(&write.path).unwrap();
        let parsed: Value = serde_json::from_str(content.trim()).unwrap();
        assert!(parsed["reason"].is_null());
    }
}
