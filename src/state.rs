use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::availability::{AvailabilityRepository, SqliteAvailability};
use crate::services::booking::BookingSessions;
use crate::services::content::{ContentRepository, SqliteContent};
use crate::services::pricing::Conversion;
use crate::services::submitter::BookingSubmitter;
use crate::services::wizard::WizardContext;

pub struct AppState {
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    pub availability: Arc<dyn AvailabilityRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub llm: Box<dyn LlmProvider>,
    pub submitter: Arc<dyn BookingSubmitter>,
    pub sessions: BookingSessions,
}

impl AppState {
    pub fn new(
        conn: Connection,
        config: AppConfig,
        clock: Arc<dyn Clock>,
        llm: Box<dyn LlmProvider>,
        submitter: Box<dyn BookingSubmitter>,
    ) -> Self {
        let db = Arc::new(Mutex::new(conn));
        Self {
            config,
            availability: Arc::new(SqliteAvailability::new(db.clone())),
            content: Arc::new(SqliteContent::new(db)),
            llm,
            submitter: Arc::from(submitter),
            sessions: BookingSessions::new(clock.clone()),
            clock,
        }
    }

    pub fn wizard_context(&self) -> WizardContext {
        WizardContext {
            availability: self.availability.clone(),
            content: self.content.clone(),
            clock: self.clock.clone(),
            locations: self.config.locations.clone(),
            conversion: Some(Conversion::gbp_to_krw(self.config.krw_per_gbp)),
        }
    }
}
