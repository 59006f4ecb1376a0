use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Every slot time is wall-clock time at the studio.
pub const STUDIO_TIMEZONE: Tz = chrono_tz::Europe::London;

/// Minimum gap between "now" and a session start for the slot to be bookable.
pub const LEAD_TIME_HOURS: i64 = 3;

pub const DEFAULT_SLOT_TIMES: &[&str] = &[
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub id: String,
    pub time: String,
    pub is_booked: bool,
    pub is_blocked: bool,
}

impl TimeSlot {
    pub fn open(time: &str) -> Self {
        Self {
            id: slot_id(time),
            time: time.to_string(),
            is_booked: false,
            is_blocked: false,
        }
    }

    pub fn starts_at(&self, date: NaiveDate) -> Option<DateTime<Tz>> {
        let time = parse_time(&self.time).ok()?;
        STUDIO_TIMEZONE
            .from_local_datetime(&date.and_time(time))
            .earliest()
    }

    pub fn is_selectable(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        if self.is_blocked || self.is_booked {
            return false;
        }
        let now_at_studio = now.with_timezone(&STUDIO_TIMEZONE);
        match self.starts_at(date) {
            Some(start) => start >= now_at_studio + Duration::hours(LEAD_TIME_HOURS),
            None => false,
        }
    }
}

/// Admin-initialized slot overrides for one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySchedule {
    pub date: String,
    pub slots: Vec<TimeSlot>,
}

impl DaySchedule {
    pub fn with_default_slots(date: NaiveDate) -> Self {
        Self {
            date: date_key(date),
            slots: default_slots(),
        }
    }

    /// Overlays this schedule's flags onto the default template. Override rows for
    /// times outside the template are ignored.
    pub fn resolve(&self) -> Vec<TimeSlot> {
        default_slots()
            .into_iter()
            .map(|slot| {
                match self.slots.iter().find(|o| o.time == slot.time) {
                    Some(o) => TimeSlot {
                        is_blocked: o.is_blocked,
                        is_booked: o.is_booked,
                        ..slot
                    },
                    None => slot,
                }
            })
            .collect()
    }
}

pub fn default_slots() -> Vec<TimeSlot> {
    DEFAULT_SLOT_TIMES.iter().map(|t| TimeSlot::open(t)).collect()
}

pub fn is_template_time(time: &str) -> bool {
    DEFAULT_SLOT_TIMES.contains(&time)
}

pub fn slot_id(time: &str) -> String {
    format!("slot-{}", time.replace(':', ""))
}

/// Canonical `YYYY-MM-DD` key used for every schedule lookup.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a date key, rejecting anything that is not already canonical.
pub fn parse_date_key(s: &str) -> anyhow::Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid date: {s}"))?;
    if date_key(date) != s {
        return Err(anyhow::anyhow!("date must be in YYYY-MM-DD form: {s}"));
    }
    Ok(date)
}

pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.len() != 2) {
        return Err(anyhow::anyhow!("invalid time format: {s}"));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| anyhow::anyhow!("time out of range: {s}"))
}
