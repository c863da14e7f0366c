use crate::time::EpochMs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A globally unique identifier (ULID as string by convention).
pub type Id = String;

pub fn new_id() -> Id {
    ulid::Ulid::new().to_string()
}

/// One input letter together with its position in the original letter set.
/// The index disambiguates repeated letters during enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedLetter {
    pub letter: char,
    pub index: u32,
}

impl TaggedLetter {
    pub fn new(letter: char, index: u32) -> Self {
        Self { letter, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    New,
    Scheduling,
    Scheduled,
    Running,
    Completed,
}

impl TaskStatus {
    /// Position in the lifecycle. Transitions never decrease it.
    pub fn rank(self) -> u8 {
        match self {
            TaskStatus::New => 0,
            TaskStatus::Scheduling => 1,
            TaskStatus::Scheduled => 2,
            TaskStatus::Running => 3,
            TaskStatus::Completed => 4,
        }
    }

    /// Monotonicity rule: re-writing the current status is allowed (the
    /// watcher's overwrites are idempotent), moving backwards is not.
    pub fn allows_transition_to(self, next: TaskStatus) -> bool {
        next.rank() >= self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::New => "NEW",
            TaskStatus::Scheduling => "SCHEDULING",
            TaskStatus::Scheduled => "SCHEDULED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(TaskStatus::New),
            "SCHEDULING" => Ok(TaskStatus::Scheduling),
            "SCHEDULED" => Ok(TaskStatus::Scheduled),
            "RUNNING" => Ok(TaskStatus::Running),
            "COMPLETED" => Ok(TaskStatus::Completed),
            other => Err(crate::Error::Validation(format!(
                "invalid task status {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkItemStatus {
    New,
    Running,
    Completed,
}

impl WorkItemStatus {
    pub fn rank(self) -> u8 {
        match self {
            WorkItemStatus::New => 0,
            WorkItemStatus::Running => 1,
            WorkItemStatus::Completed => 2,
        }
    }

    pub fn allows_transition_to(self, next: WorkItemStatus) -> bool {
        next.rank() >= self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkItemStatus::New => "NEW",
            WorkItemStatus::Running => "RUNNING",
            WorkItemStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for WorkItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkItemStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(WorkItemStatus::New),
            "RUNNING" => Ok(WorkItemStatus::Running),
            "COMPLETED" => Ok(WorkItemStatus::Completed),
            other => Err(crate::Error::Validation(format!(
                "invalid workitem status {other:?}"
            ))),
        }
    }
}

/// One letter set to be fully searched for contained dictionary words.
/// Created externally as NEW; never deleted by agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    pub letters: String,
    pub status: TaskStatus,
    #[serde(rename = "lastUpdated")]
    pub last_updated: EpochMs,
    pub started: Option<EpochMs>,
    pub completed: Option<EpochMs>,
    #[serde(rename = "scheduledItemsCount", default)]
    pub scheduled_items_count: Option<u32>,
}

/// One decomposition unit of a task's search space. The scheduler currently
/// creates exactly one per task, covering the whole letter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Id,
    pub task_id: Id,
    pub status: WorkItemStatus,
    /// Accumulated prefix; empty at creation in this design.
    pub current_sequence: String,
    /// The parent task's letters, each tagged with its original index.
    pub remaining_elements: Vec<TaggedLetter>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: EpochMs,
    pub started: Option<EpochMs>,
    pub completed: Option<EpochMs>,
}

/// A discovered dictionary word. Append-only; never updated or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub task_id: Id,
    pub word: String,
}

/// Workitem payload as submitted by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkItem {
    pub current_sequence: String,
    pub remaining_elements: Vec<TaggedLetter>,
}

// Wire shapes shared between the daemon and its clients.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTransitionRequest {
    pub status: TaskStatus,
    /// When present, the transition only succeeds if the task is still in
    /// this status. Used by agents to claim work race-free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<TaskStatus>,
    #[serde(
        rename = "scheduledItemsCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_items_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItemTransitionRequest {
    pub status: WorkItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<WorkItemStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkItemsRequest {
    pub workitems: Vec<NewWorkItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendWordRequest {
    pub word: String,
}

/// Response of the dictionary service's first-word query. `first_word` is
/// `null` when no word extends the prefix — the explicit absence marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirstWordResponse {
    pub first_word: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsWordResponse {
    pub result: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixWordsResponse {
    pub result: Vec<String>,
}
