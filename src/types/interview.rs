use chrono::{DateTime, Utc};

/// Link stored when a caller schedules an interview without one.
pub const DEFAULT_MEETING_LINK: &str = "https://meet.google.com/placeholder";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewInterview {
    pub candidate_name: String,
    pub position: String,
    pub scheduled_at: DateTime<Utc>,
    pub meeting_link: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interview {
    pub id: i64,
    pub candidate_name: String,
    pub position: String,
    pub scheduled_at: DateTime<Utc>,
    pub meeting_link: String,
    pub created_at: DateTime<Utc>,
}
