use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    require_non_empty, timestamp, Interview, NewInterview, NewTask, Task, TaskStatus,
    ValidationError, DEFAULT_MEETING_LINK,
};

#[derive(Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub assigned_to: String,
}

impl CreateTaskRequest {
    pub fn into_new_task(self) -> Result<NewTask, ValidationError> {
        Ok(NewTask {
            title: require_non_empty("title", self.title)?,
            description: require_non_empty("description", self.description)?,
            status: self.status,
            assigned_to: require_non_empty("assigned_to", self.assigned_to)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub candidate_name: String,
    pub position: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub meeting_link: Option<String>,
}

impl CreateInterviewRequest {
    pub fn into_new_interview(self) -> NewInterview {
        NewInterview {
            candidate_name: self.candidate_name,
            position: self.position,
            scheduled_at: self.scheduled_at,
            meeting_link: self
                .meeting_link
                .unwrap_or_else(|| DEFAULT_MEETING_LINK.to_string()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: String,
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            assigned_to: task.assigned_to,
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub id: i64,
    pub candidate_name: String,
    pub position: String,
    pub scheduled_at: DateTime<Utc>,
    pub meeting_link: String,
    pub created_at: DateTime<Utc>,
}

impl From<Interview> for InterviewResponse {
    fn from(interview: Interview) -> Self {
        Self {
            id: interview.id,
            candidate_name: interview.candidate_name,
            position: interview.position,
            scheduled_at: interview.scheduled_at,
            meeting_link: interview.meeting_link,
            created_at: interview.created_at,
        }
    }
}
