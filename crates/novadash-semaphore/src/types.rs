use chrono::{
    DateTime,
    Datelike,
    NaiveDateTime,
    Utc,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

/// Run status as reported by Semaphore
///
/// Anything the server sends outside the known set becomes `Unknown`, which
/// is never terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "waiting")]
    Queued,
    Starting,
    Running,
    Stopping,
    Success,
    Error,
    Stopped,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Success => "success",
            Self::Error => "error",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub playbook: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// 0 when the server omitted it
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    #[serde(default)]
    pub template_id: i64,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start: Option<DateTime<Utc>>,
    /// Only meaningful once `status` is terminal
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One line of task output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub task_id: i64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTaskRequest {
    pub template_id: i64,
    pub debug: bool,
    pub dry_run: bool,
}

/// Parses a Semaphore timestamp, treating blanks and Go zero-time as absent
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()?;

    // 0001-01-01T00:00:00Z is Go's zero value for unset times
    if parsed.year() <= 1 {
        return None;
    }

    Some(parsed)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}
