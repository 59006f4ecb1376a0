use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, queries};
use crate::models::availability::{date_key, default_slots};
use crate::models::{DaySchedule, TimeSlot};

pub trait AvailabilityRepository: Send + Sync {
    fn day_schedule(&self, date: NaiveDate) -> anyhow::Result<Option<DaySchedule>>;

    /// Creates the day's schedule from the default template if it does not exist yet.
    fn ensure_day(&self, date: NaiveDate) -> anyhow::Result<bool>;

    fn toggle_blocked(&self, date: NaiveDate, time: &str) -> anyhow::Result<bool>;

    fn set_booked(&self, date: NaiveDate, time: &str, booked: bool) -> anyhow::Result<()>;

    /// The default template with any overrides for this exact date applied.
    /// Dates nobody has configured are fully open.
    fn slots_for(&self, date: NaiveDate) -> anyhow::Result<Vec<TimeSlot>> {
        Ok(match self.day_schedule(date)? {
            Some(schedule) => schedule.resolve(),
            None => default_slots(),
        })
    }
}

pub struct SqliteAvailability {
    db: Arc<Mutex<Connection>>,
}

impl SqliteAvailability {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

impl AvailabilityRepository for SqliteAvailability {
    fn day_schedule(&self, date: NaiveDate) -> anyhow::Result<Option<DaySchedule>> {
        let conn = db::lock(&self.db);
        queries::get_day_schedule(&conn, &date_key(date))
    }

    fn ensure_day(&self, date: NaiveDate) -> anyhow::Result<bool> {
        let conn = db::lock(&self.db);
        queries::ensure_day_schedule(&conn, &date_key(date))
    }

    fn toggle_blocked(&self, date: NaiveDate, time: &str) -> anyhow::Result<bool> {
        let conn = db::lock(&self.db);
        queries::toggle_slot_blocked(&conn, &date_key(date), time)
    }

    fn set_booked(&self, date: NaiveDate, time: &str, booked: bool) -> anyhow::Result<()> {
        let conn = db::lock(&self.db);
        queries::set_slot_booked(&conn, &date_key(date), time, booked)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotAvailability {
    #[serde(flatten)]
    pub slot: TimeSlot,
    pub selectable: bool,
}

/// Every slot of the day, annotated with whether it can be picked right now.
pub fn day_availability(
    repo: &dyn AvailabilityRepository,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<SlotAvailability>> {
    Ok(repo
        .slots_for(date)?
        .into_iter()
        .map(|slot| SlotAvailability {
            selectable: slot.is_selectable(date, now),
            slot,
        })
        .collect())
}

pub fn selectable_slots(
    repo: &dyn AvailabilityRepository,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<TimeSlot>> {
    Ok(repo
        .slots_for(date)?
        .into_iter()
        .filter(|slot| slot.is_selectable(date, now))
        .collect())
}
