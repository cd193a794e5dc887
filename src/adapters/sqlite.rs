use crate::domain::model::{Agent, LeadRecord, ListId, ListPartition, StoredList};
use crate::domain::ports::{AgentRoster, ListStore, ListTransaction};
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{validate_email, validate_non_empty_string};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS agents (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    email      TEXT NOT NULL UNIQUE,
    mobile     TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lists (
    id          TEXT PRIMARY KEY,
    agent_id    TEXT NOT NULL,
    uploaded_by TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_lists_agent ON lists(agent_id);

CREATE TABLE IF NOT EXISTS list_items (
    list_id    TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    position   INTEGER NOT NULL,
    first_name TEXT NOT NULL,
    phone      TEXT NOT NULL,
    notes      TEXT NOT NULL,
    PRIMARY KEY (list_id, position)
);
"#;

/// SQLite-backed agent roster and list store.
///
/// Every upload runs inside one `BEGIN IMMEDIATE` transaction.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path.as_ref())?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Adds an agent to the end of the roster. Email is stored lower-cased and must be unique.
    pub async fn add_agent(&self, name: &str, email: &str, mobile: &str) -> Result<Agent> {
        validate_non_empty_string("name", name)?;
        validate_email("email", email)?;
        validate_non_empty_string("mobile", mobile)?;

        let agent = Agent {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            mobile: mobile.trim().to_string(),
        };

        let conn = self.conn.lock().await;
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM agents WHERE email = ?1",
                params![agent.email],
                |r| r.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(LeadError::DuplicateAgent { email: agent.email });
        }

        conn.execute(
            "INSERT INTO agents(id, name, email, mobile, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                agent.id,
                agent.name,
                agent.email,
                agent.mobile,
                Utc::now().to_rfc3339()
            ],
        )?;
        tracing::info!("👤 Agent {} <{}> added", agent.name, agent.email);
        Ok(agent)
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent> {
        let conn = self.conn.lock().await;
        Self::find_agent(&conn, agent_id)?.ok_or_else(|| LeadError::AgentNotFound {
            agent_id: agent_id.to_string(),
        })
    }

    /// Updates the given fields of an agent. A field that is `None` or blank keeps
    /// its current value; a new email is lower-cased and must stay unique.
    pub async fn update_agent(
        &self,
        agent_id: &str,
        name: Option<&str>,
        email: Option<&str>,
        mobile: Option<&str>,
    ) -> Result<Agent> {
        let provided = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let email = provided(email);
        if let Some(email) = &email {
            validate_email("email", email)?;
        }

        let conn = self.conn.lock().await;
        let current = Self::find_agent(&conn, agent_id)?.ok_or_else(|| LeadError::AgentNotFound {
            agent_id: agent_id.to_string(),
        })?;

        let agent = Agent {
            id: current.id,
            name: provided(name).unwrap_or(current.name),
            email: email.map(|e| e.to_lowercase()).unwrap_or(current.email),
            mobile: provided(mobile).unwrap_or(current.mobile),
        };

        let clash: Option<String> = conn
            .query_row(
                "SELECT id FROM agents WHERE email = ?1 AND id <> ?2",
                params![agent.email, agent.id],
                |r| r.get(0),
            )
            .optional()?;
        if clash.is_some() {
            return Err(LeadError::DuplicateAgent { email: agent.email });
        }

        conn.execute(
            "UPDATE agents SET name = ?1, email = ?2, mobile = ?3 WHERE id = ?4",
            params![agent.name, agent.email, agent.mobile, agent.id],
        )?;
        tracing::info!("✏️ Agent {} updated", agent.id);
        Ok(agent)
    }

    fn find_agent(conn: &Connection, agent_id: &str) -> Result<Option<Agent>> {
        let agent = conn
            .query_row(
                "SELECT id, name, email, mobile FROM agents WHERE id = ?1",
                params![agent_id],
                |r| {
                    Ok(Agent {
                        id: r.get(0)?,
                        name: r.get(1)?,
                        email: r.get(2)?,
                        mobile: r.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(agent)
    }

    /// Removes an agent from the roster. Lists already assigned to it are kept.
    pub async fn remove_agent(&self, agent_id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM agents WHERE id = ?1", params![agent_id])?;
        Ok(removed > 0)
    }

    fn load_items(conn: &Connection, list_id: &str) -> Result<Vec<LeadRecord>> {
        let mut stmt = conn.prepare_cached(
            "SELECT first_name, phone, notes FROM list_items WHERE list_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![list_id], |r| {
            Ok(LeadRecord {
                first_name: r.get(0)?,
                phone: r.get(1)?,
                notes: r.get(2)?,
            })
        })?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn load_lists(conn: &Connection, agent_id: Option<&str>) -> Result<Vec<StoredList>> {
        let mut stmt = conn.prepare_cached(
            "SELECT id, agent_id, uploaded_by, created_at FROM lists
             WHERE (?1 IS NULL OR agent_id = ?1) ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![agent_id], |r| {
            let id: String = r.get(0)?;
            let created_at: String = r.get(3)?;
            Ok((
                parse_uuid(0, &id)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                parse_timestamp(3, &created_at)?,
            ))
        })?;

        let mut lists = Vec::new();
        for row in rows {
            let (id, agent_id, uploaded_by, created_at) = row?;
            let items = Self::load_items(conn, &id.to_string())?;
            lists.push(StoredList {
                id,
                agent_id,
                items,
                uploaded_by,
                created_at,
            });
        }
        Ok(lists)
    }
}

fn parse_uuid(idx: usize, value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[async_trait]
impl AgentRoster for SqliteStore {
    async fn list_active_agents(&self) -> Result<Vec<Agent>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare_cached("SELECT id, name, email, mobile FROM agents ORDER BY seq")?;
        let rows = stmt.query_map([], |r| {
            Ok(Agent {
                id: r.get(0)?,
                name: r.get(1)?,
                email: r.get(2)?,
                mobile: r.get(3)?,
            })
        })?;
        let mut agents = Vec::new();
        for row in rows {
            agents.push(row?);
        }
        Ok(agents)
    }
}

/// Holds the connection for the lifetime of the transaction. Dropping it
/// without `commit` rolls back.
pub struct SqliteTransaction {
    conn: OwnedMutexGuard<Connection>,
    active: bool,
}

impl SqliteTransaction {
    fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(LeadError::StorageError {
                message: "transaction already finished".to_string(),
            })
        }
    }
}

#[async_trait]
impl ListTransaction for SqliteTransaction {
    async fn save(&mut self, partition: &ListPartition) -> Result<ListId> {
        self.ensure_active()?;
        let id = Uuid::new_v4();
        let id_text = id.to_string();

        self.conn.execute(
            "INSERT INTO lists(id, agent_id, uploaded_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                id_text,
                partition.agent_id,
                partition.uploaded_by,
                partition.created_at.to_rfc3339()
            ],
        )?;

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO list_items(list_id, position, first_name, phone, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, item) in partition.items.iter().enumerate() {
            stmt.execute(params![
                id_text,
                position as i64,
                item.first_name,
                item.phone,
                item.notes
            ])?;
        }
        Ok(id)
    }

    async fn commit(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.conn.execute_batch("COMMIT")?;
        self.active = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        // 失敗時保持 active，Drop 會再試一次
        self.conn.execute_batch("ROLLBACK")?;
        self.active = false;
        Ok(())
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::error!("❌ Rollback of abandoned transaction failed: {}", e);
            }
        }
    }
}

#[async_trait]
impl ListStore for SqliteStore {
    async fn begin(&self) -> Result<Box<dyn ListTransaction + '_>> {
        let conn = self.conn.clone().lock_owned().await;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTransaction { conn, active: true }))
    }

    async fn lists_for_agent(&self, agent_id: &str) -> Result<Vec<StoredList>> {
        let conn = self.conn.lock().await;
        Self::load_lists(&conn, Some(agent_id))
    }

    async fn all_lists(&self) -> Result<Vec<StoredList>> {
        let conn = self.conn.lock().await;
        Self::load_lists(&conn, None)
    }
}
