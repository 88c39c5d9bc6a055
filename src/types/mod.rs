mod interview;
mod task;
pub mod timestamp;
mod validation;

pub use interview::{Interview, NewInterview, DEFAULT_MEETING_LINK};
pub use task::{NewTask, Task, TaskStatus};
pub use validation::{require_non_empty, ValidationError};
