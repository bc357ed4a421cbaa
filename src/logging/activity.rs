//! Activity journal
//!
//! Every gamification side effect is emitted as a `tracing` event on the
//! `activity` target and, when a path is configured, appended to a JSONL file.
//! Journal failures are logged and swallowed; they never fail a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Activity kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UserRegistered,
    PickupScheduled,
    PickupCompleted,
    PledgeSubmitted,
    BadgesUpdated,
}

/// One journal line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub email: String,
    /// XP granted by this event
    #[serde(default)]
    pub xp: i64,
    /// Streak granted by this event
    #[serde(default)]
    pub streak: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<String>>,
    /// False when the award found no matching user
    #[serde(default = "default_true")]
    pub applied: bool,
}

fn default_true() -> bool {
    true
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, email: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            email: email.into(),
            xp: 0,
            streak: 0,
            pickup_id: None,
            badges: None,
            applied: true,
        }
    }

    pub fn with_award(mut self, xp: i64, streak: i64) -> Self {
        self.xp = xp;
        self.streak = streak;
        self
    }

    pub fn with_pickup(mut self, pickup_id: String) -> Self {
        self.pickup_id = Some(pickup_id);
        self
    }

    pub fn with_badges(mut self, badges: Vec<String>) -> Self {
        self.badges = Some(badges);
        self
    }

    pub fn with_applied(mut self, applied: bool) -> Self {
        self.applied = applied;
        self
    }

    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Journal writer shared across requests
#[derive(Clone, Default)]
pub struct ActivityJournal {
    writer: Arc<Mutex<Option<BufWriter<File>>>>,
}

impl ActivityJournal {
    /// Journal that only emits tracing events
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal that also appends to `path`
    pub fn with_file(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        info!("Activity journal writing to {}", path.display());

        Ok(Self {
            writer: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
        })
    }

    /// Open from an optional configured path, falling back to tracing only
    pub fn from_config(path: Option<&PathBuf>) -> Self {
        match path {
            Some(path) => Self::with_file(path).unwrap_or_else(|e| {
                error!("Failed to open activity journal {}: {}", path.display(), e);
                Self::new()
            }),
            None => Self::new(),
        }
    }

    pub async fn record(&self, event: ActivityEvent) {
        info!(
            target: "activity",
            kind = ?event.kind,
            email = %event.email,
            xp = event.xp,
            streak = event.streak,
            applied = event.applied,
            "activity"
        );

        let mut guard = self.writer.lock().await;
        let Some(writer) = guard.as_mut() else {
            return;
        };

        let line = match event.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize activity event: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            error!("Failed to write activity event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ActivityEvent::new(ActivityKind::PickupCompleted, "a@x.y")
            .with_award(20, 1)
            .with_pickup("abc".into());

        let line = event.to_jsonl().unwrap();
        assert!(line.contains("\"kind\":\"pickup_completed\""));
        assert!(line.contains("\"pickup_id\":\"abc\""));
        assert!(!line.contains("badges"));
    }

    #[tokio::test]
    async fn test_file_journal_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "greenpoint-activity-{}.jsonl",
            uuid::Uuid::new_v4()
        ));
        let journal = ActivityJournal::with_file(&path).unwrap();

        journal
            .record(ActivityEvent::new(ActivityKind::UserRegistered, "a@x.y"))
            .await;
        journal
            .record(
                ActivityEvent::new(ActivityKind::BadgesUpdated, "a@x.y")
                    .with_badges(vec!["Plastic Buster".into()]),
            )
            .await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: ActivityEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.kind, ActivityKind::BadgesUpdated);
        assert_eq!(parsed.badges, Some(vec!["Plastic Buster".to_string()]));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_tracing_only_journal() {
        ActivityJournal::new()
            .record(ActivityEvent::new(ActivityKind::PledgeSubmitted, "a@x.y"))
            .await;
    }
}
