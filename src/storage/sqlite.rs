use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::traits::{StorageRead, StorageWrite};
use crate::types::{Interview, NewInterview, NewTask, Task, TaskStatus};

const DB_SCHEMA_VERSION: i64 = 1;

#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pub path: String,
}

fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        assigned_to: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_interview_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Interview> {
    Ok(Interview {
        id: row.get(0)?,
        candidate_name: row.get(1)?,
        position: row.get(2)?,
        scheduled_at: row.get(3)?,
        meeting_link: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn db_insert_task(
    conn: &Connection,
    task: &NewTask,
    created_at: DateTime<Utc>,
) -> rusqlite::Result<Task> {
    conn.query_row(
        r#"
        INSERT INTO tasks (title, description, status, assigned_to, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, title, description, status, assigned_to, created_at
        "#,
        params![
            task.title,
            task.description,
            task.status,
            task.assigned_to,
            created_at
        ],
        map_task_row,
    )
}

fn db_list_tasks(conn: &Connection) -> rusqlite::Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, status, assigned_to, created_at FROM tasks ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], map_task_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_load_task(conn: &Connection, id: i64) -> rusqlite::Result<Option<Task>> {
    conn.query_row(
        "SELECT id, title, description, status, assigned_to, created_at FROM tasks WHERE id = ?1",
        params![id],
        map_task_row,
    )
    .optional()
}

fn db_update_task_status(
    conn: &Connection,
    id: i64,
    status: TaskStatus,
) -> rusqlite::Result<Option<Task>> {
    conn.query_row(
        r#"
        UPDATE tasks SET status = ?1 WHERE id = ?2
        RETURNING id, title, description, status, assigned_to, created_at
        "#,
        params![status, id],
        map_task_row,
    )
    .optional()
}

fn db_insert_interview(
    conn: &Connection,
    interview: &NewInterview,
    created_at: DateTime<Utc>,
) -> rusqlite::Result<Interview> {
    conn.query_row(
        r#"
        INSERT INTO interviews (candidate_name, position, scheduled_at, meeting_link, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, candidate_name, position, scheduled_at, meeting_link, created_at
        "#,
        params![
            interview.candidate_name,
            interview.position,
            interview.scheduled_at,
            interview.meeting_link,
            created_at
        ],
        map_interview_row,
    )
}

fn db_list_interviews(conn: &Connection) -> rusqlite::Result<Vec<Interview>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, candidate_name, position, scheduled_at, meeting_link, created_at
        FROM interviews
        ORDER BY id
        "#,
    )?;
    let rows = stmt
        .query_map([], map_interview_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_load_interview(conn: &Connection, id: i64) -> rusqlite::Result<Option<Interview>> {
    conn.query_row(
        r#"
        SELECT id, candidate_name, position, scheduled_at, meeting_link, created_at
        FROM interviews
        WHERE id = ?1
        "#,
        params![id],
        map_interview_row,
    )
    .optional()
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        if !Path::new(&self.path).exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))?;
        Ok(())
    }

    /// Opens a connection for the duration of `f`. It is closed on every exit path.
    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;

        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        if version == 0 {
            log::info!(
                "SQLite schema migration: {} -> {}",
                version,
                DB_SCHEMA_VERSION
            );
            conn.execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Pending'
                    CHECK (status IN ('Pending', 'In Progress', 'Completed')),
                assigned_to TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS tasks_title_idx ON tasks(title);
            CREATE INDEX IF NOT EXISTS tasks_assigned_to_idx ON tasks(assigned_to);
            CREATE TRIGGER IF NOT EXISTS tasks_identity_immutable
                BEFORE UPDATE OF id, created_at ON tasks
                WHEN NEW.id IS NOT OLD.id OR NEW.created_at IS NOT OLD.created_at
            BEGIN
                SELECT RAISE(ABORT, 'task id and created_at are immutable');
            END;

            CREATE TABLE IF NOT EXISTS interviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                candidate_name TEXT NOT NULL,
                position TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                meeting_link TEXT NOT NULL DEFAULT 'https://meet.google.com/placeholder',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS interviews_candidate_name_idx
                ON interviews(candidate_name);
            CREATE TRIGGER IF NOT EXISTS interviews_identity_immutable
                BEFORE UPDATE OF id, created_at ON interviews
                WHEN NEW.id IS NOT OLD.id OR NEW.created_at IS NOT OLD.created_at
            BEGIN
                SELECT RAISE(ABORT, 'interview id and created_at are immutable');
            END;
        "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl StorageRead for SqliteStorage {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.with_conn(db_list_tasks)?)
    }

    fn load_task(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.with_conn(|conn| db_load_task(conn, id))?)
    }

    fn list_interviews(&self) -> Result<Vec<Interview>> {
        Ok(self.with_conn(db_list_interviews)?)
    }

    fn load_interview(&self, id: i64) -> Result<Option<Interview>> {
        Ok(self.with_conn(|conn| db_load_interview(conn, id))?)
    }
}

impl StorageWrite for SqliteStorage {
    fn insert_task(&self, task: NewTask) -> Result<Task> {
        let created_at = Utc::now();
        let stored = self.with_conn(|conn| db_insert_task(conn, &task, created_at))?;
        log::debug!("Stored task {} for {}", stored.id, stored.assigned_to);
        Ok(stored)
    }

    fn update_task_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>> {
        Ok(self.with_conn(|conn| db_update_task_status(conn, id, status))?)
    }

    fn insert_interview(&self, interview: NewInterview) -> Result<Interview> {
        let created_at = Utc::now();
        let stored = self.with_conn(|conn| db_insert_interview(conn, &interview, created_at))?;
        log::debug!(
            "Stored interview {} for {}",
            stored.id,
            stored.candidate_name
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_MEETING_LINK;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn temp_storage(dir: &TempDir) -> SqliteStorage {
        let repo = SqliteStorage::new(dir.path().join("virtual_hr.sqlite"));
        repo.init().unwrap();
        repo
    }

    fn sample_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "Set up laptop".to_string(),
            status: TaskStatus::Pending,
            assigned_to: "Alice".to_string(),
        }
    }

    fn sample_interview(candidate: &str, link: &str) -> NewInterview {
        NewInterview {
            candidate_name: candidate.to_string(),
            position: "Backend Engineer".to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap(),
            meeting_link: link.to_string(),
        }
    }

    #[test]
    fn sqlite_reset_all_ok_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.sqlite");
        let repo = SqliteStorage::new(&path);
        repo.reset_all().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn sqlite_reset_all_removes_existing_file() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);
        repo.insert_task(sample_task("Onboard")).unwrap();
        repo.reset_all().unwrap();
        assert!(!Path::new(&repo.path).exists());

        repo.init().unwrap();
        assert!(repo.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn sqlite_init_initializes_schema() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);

        let conn = Connection::open(&repo.path).unwrap();
        for table in ["tasks", "interviews"] {
            let name = conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    params![table],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .unwrap();
            assert_eq!(name.as_deref(), Some(table));
        }

        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn sqlite_fails_on_mismatched_schema_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad_version.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();

        let err = SqliteStorage::new(&path)
            .init()
            .expect_err("init should fail on version mismatch");
        let msg = format!("{err}");
        assert!(msg.contains("database schema version mismatch"));
        assert!(msg.contains("--reset"));
    }

    #[test]
    fn sqlite_insert_task_assigns_ids_and_created_at() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);

        let before = Utc::now();
        let first = repo.insert_task(sample_task("Onboard")).unwrap();
        let second = repo.insert_task(sample_task("Payroll")).unwrap();
        let after = Utc::now();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.title, "Onboard");
        assert_eq!(first.status, TaskStatus::Pending);
        assert!(first.created_at >= before && first.created_at <= after);

        let loaded = repo.load_task(first.id).unwrap().unwrap();
        assert_eq!(loaded, first);
        assert!(repo.load_task(99).unwrap().is_none());
    }

    #[test]
    fn sqlite_list_tasks_returns_rows_in_id_order() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);
        for title in ["a", "b", "c"] {
            repo.insert_task(sample_task(title)).unwrap();
        }

        let titles: Vec<_> = repo
            .list_tasks()
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[test]
    fn sqlite_update_task_status_changes_only_status() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);
        let stored = repo.insert_task(sample_task("Onboard")).unwrap();

        let updated = repo
            .update_task_status(stored.id, TaskStatus::Completed)
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(
            Task {
                status: stored.status,
                ..updated.clone()
            },
            stored
        );
        assert_eq!(repo.load_task(stored.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn sqlite_update_task_status_missing_id_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);
        let stored = repo.insert_task(sample_task("Onboard")).unwrap();

        let missing = repo
            .update_task_status(stored.id + 1, TaskStatus::Completed)
            .unwrap();

        assert!(missing.is_none());
        assert_eq!(repo.list_tasks().unwrap(), vec![stored]);
    }

    #[test]
    fn sqlite_rejects_out_of_enum_status_and_created_at_rewrites() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);
        let stored = repo.insert_task(sample_task("Onboard")).unwrap();

        let conn = Connection::open(&repo.path).unwrap();
        assert!(conn
            .execute(
                "UPDATE tasks SET status = 'Bogus' WHERE id = ?1",
                params![stored.id]
            )
            .is_err());
        assert!(conn
            .execute(
                "UPDATE tasks SET created_at = '2000-01-01 00:00:00+00:00' WHERE id = ?1",
                params![stored.id]
            )
            .is_err());

        assert_eq!(repo.load_task(stored.id).unwrap().unwrap(), stored);
    }

    #[test]
    fn sqlite_insert_and_list_interviews_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = temp_storage(&dir);

        let first = repo
            .insert_interview(sample_interview("Bob", DEFAULT_MEETING_LINK))
            .unwrap();
        let second = repo
            .insert_interview(sample_interview("Carol", "https://meet.example/carol"))
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(first.meeting_link, DEFAULT_MEETING_LINK);
        assert_eq!(
            first.scheduled_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(second.meeting_link, "https://meet.example/carol");

        assert_eq!(repo.list_interviews().unwrap(), vec![first.clone(), second]);
        assert_eq!(repo.load_interview(first.id).unwrap(), Some(first));
        assert!(repo.load_interview(42).unwrap().is_none());
    }

    #[test]
    fn sqlite_data_survives_reopening() {
        let dir = TempDir::new().unwrap();
        let stored = temp_storage(&dir)
            .insert_task(sample_task("Onboard"))
            .unwrap();

        let reopened = SqliteStorage::new(dir.path().join("virtual_hr.sqlite"));
        reopened.init().unwrap();
        assert_eq!(reopened.list_tasks().unwrap(), vec![stored]);
    }
}
