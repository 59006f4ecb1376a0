use rusqlite::{params, Connection, OptionalExtension};

use crate::models::availability::{default_slots, is_template_time, slot_id};
use crate::models::{DaySchedule, TimeSlot};

// ── Content ──

pub fn get_content(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM content WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_content(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO content (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

pub fn list_content_keys(conn: &Connection) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT key FROM content ORDER BY key ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut keys = vec![];
    for row in rows {
        keys.push(row?);
    }
    Ok(keys)
}

// ── Day schedules ──

/// Returns the stored schedule for an exact date key, or `None` when the day
/// has never been initialized.
pub fn get_day_schedule(conn: &Connection, date: &str) -> anyhow::Result<Option<DaySchedule>> {
    let mut stmt = conn.prepare(
        "SELECT time, is_blocked, is_booked FROM day_slots WHERE date = ?1 ORDER BY time ASC",
    )?;

    let rows = stmt.query_map(params![date], |row| {
        let time: String = row.get(0)?;
        Ok(TimeSlot {
            id: slot_id(&time),
            time,
            is_blocked: row.get(1)?,
            is_booked: row.get(2)?,
        })
    })?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row?);
    }

    if slots.is_empty() {
        return Ok(None);
    }

    Ok(Some(DaySchedule {
        date: date.to_string(),
        slots,
    }))
}

/// Creates the day's rows from the default template. Existing rows are left alone.
pub fn ensure_day_schedule(conn: &Connection, date: &str) -> anyhow::Result<bool> {
    let mut created = 0;
    for slot in default_slots() {
        created += conn.execute(
            "INSERT OR IGNORE INTO day_slots (date, time, is_blocked, is_booked)
             VALUES (?1, ?2, 0, 0)",
            params![date, slot.time],
        )?;
    }
    Ok(created > 0)
}

pub fn toggle_slot_blocked(conn: &Connection, date: &str, time: &str) -> anyhow::Result<bool> {
    anyhow::ensure!(is_template_time(time), "unknown slot time: {time}");
    ensure_day_schedule(conn, date)?;

    conn.execute(
        "UPDATE day_slots SET is_blocked = NOT is_blocked, updated_at = datetime('now')
         WHERE date = ?1 AND time = ?2",
        params![date, time],
    )?;

    let blocked = conn.query_row(
        "SELECT is_blocked FROM day_slots WHERE date = ?1 AND time = ?2",
        params![date, time],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(blocked)
}

pub fn set_slot_booked(
    conn: &Connection,
    date: &str,
    time: &str,
    booked: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(is_template_time(time), "unknown slot time: {time}");
    ensure_day_schedule(conn, date)?;

    conn.execute(
        "UPDATE day_slots SET is_booked = ?3, updated_at = datetime('now')
         WHERE date = ?1 AND time = ?2",
        params![date, time, booked],
    )?;
    Ok(())
}
