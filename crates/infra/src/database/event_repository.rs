//! SQLite-backed implementation of the EventStore port.
//!
//! The mutating methods wrap the event row, its membership rows, and the
//! operation-log row in one transaction; partial failure rolls back all
//! three.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use calendai_core::events::ports::{EventStore, NewOperationLog};
use calendai_domain::{
    CalendaiError, Event, EventFilter, EventPatch, EventType, NewEvent, Result,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::{debug, instrument};

use super::{escape_like, from_ts, insert_operation_log, DbConnection, DbPool};
use crate::errors::InfraError;

const EVENT_COLUMNS: &str =
    "id, owner_id, title, event_type, start_ts, end_ts, location, description, created_at, updated_at";

/// SQLite implementation of EventStore.
pub struct SqliteEventStore {
    pool: DbPool,
}

impl SqliteEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<DbConnection> {
        self.pool.get().map_err(InfraError::from).map_err(Into::into)
    }
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let type_raw: String = row.get(3)?;
    let event_type = EventType::parse(&type_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown event type: {type_raw}").into(),
        )
    })?;
    Ok(Event {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        event_type,
        start_time: from_ts(row.get(4)?),
        end_time: from_ts(row.get(5)?),
        location: row.get(6)?,
        description: row.get(7)?,
        created_at: from_ts(row.get(8)?),
        updated_at: from_ts(row.get(9)?),
        participant_ids: Vec::new(),
    })
}

fn load_participants(conn: &Connection, event_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM event_participants WHERE event_id = ? ORDER BY id")
        .map_err(InfraError::from)?;
    let ids = stmt
        .query_map(params![event_id], |row| row.get(0))
        .map_err(InfraError::from)?
        .collect::<rusqlite::Result<Vec<i64>>>()
        .map_err(InfraError::from)?;
    Ok(ids)
}

fn attach_participants(conn: &Connection, mut events: Vec<Event>) -> Result<Vec<Event>> {
    for event in &mut events {
        event.participant_ids = load_participants(conn, event.id)?;
    }
    Ok(events)
}

fn load_event(conn: &Connection, event_id: i64) -> Result<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
    let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
    let mut rows = stmt.query_map(params![event_id], map_event_row).map_err(InfraError::from)?;
    match rows.next() {
        Some(row) => {
            let mut event = row.map_err(InfraError::from)?;
            event.participant_ids = load_participants(conn, event_id)?;
            Ok(Some(event))
        }
        None => Ok(None),
    }
}

fn insert_participants(conn: &Connection, event_id: i64, participant_ids: &[i64]) -> Result<()> {
    let mut stmt = conn
        .prepare("INSERT OR IGNORE INTO event_participants (event_id, user_id) VALUES (?, ?)")
        .map_err(InfraError::from)?;
    for user_id in participant_ids {
        stmt.execute(params![event_id, user_id]).map_err(InfraError::from)?;
    }
    Ok(())
}

fn replace_participants(conn: &Connection, event_id: i64, participant_ids: &[i64]) -> Result<()> {
    conn.execute("DELETE FROM event_participants WHERE event_id = ?", params![event_id])
        .map_err(InfraError::from)?;
    insert_participants(conn, event_id, participant_ids)
}

#[async_trait]
impl EventStore for SqliteEventStore {
    #[instrument(skip(self))]
    async fn find_owned(&self, owner_id: i64, event_id: i64) -> Result<Option<Event>> {
        let conn = self.connection()?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ? AND owner_id = ?");
        let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
        let mut rows = stmt
            .query_map(params![event_id, owner_id], map_event_row)
            .map_err(InfraError::from)?;
        match rows.next() {
            Some(row) => {
                let mut event = row.map_err(InfraError::from)?;
                event.participant_ids = load_participants(&conn, event_id)?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, event_id: i64) -> Result<Option<Event>> {
        let conn = self.connection()?;
        load_event(&conn, event_id)
    }

    #[instrument(skip(self, keywords), fields(keyword_count = keywords.len()))]
    async fn search_candidates(
        &self,
        owner_id: i64,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Event>> {
        let conn = self.connection()?;

        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = ?");
        let mut values: Vec<Value> = vec![owner_id.into()];

        if let Some((day_start, day_end)) = window {
            // Day-overlap rule: start < day_end AND end >= day_start.
            sql.push_str(" AND start_ts < ? AND end_ts >= ?");
            values.push(day_end.timestamp().into());
            values.push(day_start.timestamp().into());
        }
        for keyword in keywords {
            sql.push_str(" AND (title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')");
            let pattern = format!("%{}%", escape_like(keyword));
            values.push(pattern.clone().into());
            values.push(pattern.into());
        }
        sql.push_str(" ORDER BY start_ts DESC LIMIT ?");
        values.push((limit as i64).into());

        let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
        let events = stmt
            .query_map(params_from_iter(values), map_event_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<Event>>>()
            .map_err(InfraError::from)?;

        debug!(count = events.len(), "candidate search complete");
        attach_participants(&conn, events)
    }

    #[instrument(skip(self, filter))]
    async fn list_visible(&self, user_id: i64, filter: &EventFilter) -> Result<Vec<Event>> {
        let conn = self.connection()?;

        let mut sql = format!(
            "SELECT DISTINCT e.{}
             FROM events e
             LEFT JOIN event_participants p ON p.event_id = e.id
             WHERE (e.owner_id = ? OR p.user_id = ?)",
            EVENT_COLUMNS.replace(", ", ", e."),
        );
        let mut values: Vec<Value> = vec![user_id.into(), user_id.into()];

        if let Some(event_type) = filter.event_type {
            sql.push_str(" AND e.event_type = ?");
            values.push(event_type.as_str().to_string().into());
        }
        if let Some(start) = filter.start {
            sql.push_str(" AND e.end_ts >= ?");
            values.push(start.timestamp().into());
        }
        if let Some(end) = filter.end {
            sql.push_str(" AND e.start_ts <= ?");
            values.push(end.timestamp().into());
        }
        sql.push_str(" ORDER BY e.start_ts ASC");

        let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
        let events = stmt
            .query_map(params_from_iter(values), map_event_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<Event>>>()
            .map_err(InfraError::from)?;
        attach_participants(&conn, events)
    }

    #[instrument(skip(self))]
    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let conn = self.connection()?;
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE start_ts >= ? AND start_ts <= ?
             ORDER BY start_ts ASC"
        );
        let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
        let events = stmt
            .query_map(params![from.timestamp(), until.timestamp()], map_event_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<Event>>>()
            .map_err(InfraError::from)?;
        attach_participants(&conn, events)
    }

    #[instrument(skip(self, new, log), fields(owner_id = new.owner_id))]
    async fn insert_event(&self, new: NewEvent, log: NewOperationLog) -> Result<Event> {
        let mut conn = self.connection()?;
        let now = Utc::now().timestamp();

        let tx = conn.transaction().map_err(InfraError::from)?;
        tx.execute(
            "INSERT INTO events
                (owner_id, title, event_type, start_ts, end_ts, location, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.owner_id,
                new.title,
                new.event_type.as_str(),
                new.start_time.timestamp(),
                new.end_time.timestamp(),
                new.location,
                new.description,
                now,
                now,
            ],
        )
        .map_err(InfraError::from)?;
        let event_id = tx.last_insert_rowid();
        insert_participants(&tx, event_id, &new.participant_ids)?;
        insert_operation_log(&tx, &log, now)?;
        tx.commit().map_err(InfraError::from)?;

        debug!(event_id, "event inserted");
        load_event(&conn, event_id)?
            .ok_or_else(|| CalendaiError::Database(format!("event {event_id} vanished after insert")))
    }

    #[instrument(skip(self, patch, participant_ids, log))]
    async fn update_event(
        &self,
        event_id: i64,
        patch: EventPatch,
        participant_ids: Option<Vec<i64>>,
        log: NewOperationLog,
    ) -> Result<Event> {
        let mut conn = self.connection()?;
        let now = Utc::now().timestamp();

        let tx = conn.transaction().map_err(InfraError::from)?;

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(title) = patch.title {
            sets.push("title = ?");
            values.push(title.into());
        }
        if let Some(event_type) = patch.event_type {
            sets.push("event_type = ?");
            values.push(event_type.as_str().to_string().into());
        }
        if let Some(start) = patch.start_time {
            sets.push("start_ts = ?");
            values.push(start.timestamp().into());
        }
        if let Some(end) = patch.end_time {
            sets.push("end_ts = ?");
            values.push(end.timestamp().into());
        }
        if let Some(location) = patch.location {
            sets.push("location = ?");
            values.push(location.into());
        }
        if let Some(description) = patch.description {
            sets.push("description = ?");
            values.push(description.into());
        }
        sets.push("updated_at = ?");
        values.push(now.into());
        values.push(event_id.into());

        let sql = format!("UPDATE events SET {} WHERE id = ?", sets.join(", "));
        let affected = tx.execute(&sql, params_from_iter(values)).map_err(InfraError::from)?;
        if affected == 0 {
            return Err(CalendaiError::NotFound(format!("event {event_id}")));
        }
        if let Some(ids) = &participant_ids {
            replace_participants(&tx, event_id, ids)?;
        }
        insert_operation_log(&tx, &log, now)?;
        tx.commit().map_err(InfraError::from)?;

        debug!(event_id, "event updated");
        load_event(&conn, event_id)?
            .ok_or_else(|| CalendaiError::NotFound(format!("event {event_id}")))
    }

    #[instrument(skip(self, log))]
    async fn delete_event(&self, event_id: i64, log: NewOperationLog) -> Result<()> {
        let mut conn = self.connection()?;
        let now = Utc::now().timestamp();

        let tx = conn.transaction().map_err(InfraError::from)?;
        tx.execute("DELETE FROM event_participants WHERE event_id = ?", params![event_id])
            .map_err(InfraError::from)?;
        let affected = tx
            .execute("DELETE FROM events WHERE id = ?", params![event_id])
            .map_err(InfraError::from)?;
        if affected == 0 {
            return Err(CalendaiError::NotFound(format!("event {event_id}")));
        }
        insert_operation_log(&tx, &log, now)?;
        tx.commit().map_err(InfraError::from)?;

        debug!(event_id, "event deleted");
        Ok(())
    }
}
