pub mod relay;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::Locale;
use crate::services::wizard::BookingSubmission;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("no longer available: {}", .0.join(", "))]
    AvailabilityStale(Vec<String>),

    #[error("booking relay unreachable: {0}")]
    Transport(String),

    #[error("booking relay rejected the request with status {0}")]
    Rejected(u16),

    #[error("booking relay is not configured")]
    NotConfigured,
}

/// Flat form the relay forwards to the studio's inbox.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    #[serde(rename = "_subject")]
    pub subject: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub product: String,
    pub people: u32,
    pub relationship: String,
    pub outfit: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub requests: String,
    pub liked_photos: String,
    pub price_total: String,
    pub price_deposit: String,
    pub price_balance: String,
    pub locale: String,
}

impl BookingPayload {
    pub fn from_submission(submission: &BookingSubmission) -> Self {
        let draft = &submission.draft;
        let client = &draft.client;
        let date = draft
            .date
            .map(|d| format_date(d, submission.locale))
            .unwrap_or_default();

        Self {
            subject: format!("New booking: {} ({date})", client.name.trim()),
            name: client.name.trim().to_string(),
            date,
            time: draft.times.join(", "),
            location: draft.locations.join(", "),
            product: submission.package.title.get(submission.locale).to_string(),
            people: client.people_count,
            relationship: client.relationship.trim().to_string(),
            outfit: client.outfit.trim().to_string(),
            contact: client.contact_id.trim().to_string(),
            phone: client.phone.trim().to_string(),
            email: client.email.trim().to_string(),
            requests: client.message.trim().to_string(),
            liked_photos: draft.liked_photo_refs.join("\n"),
            price_total: submission.price.total_display(),
            price_deposit: submission.price.deposit_display(),
            price_balance: submission.price.balance_display(),
            locale: submission.locale.as_str().to_string(),
        }
    }
}

pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::En => date.format("%A, %-d %B %Y").to_string(),
        Locale::Ko => format!("{}년 {}월 {}일", date.year(), date.month(), date.day()),
    }
}

/// Delivers a finished booking. Not idempotent: every successful call is a new
/// enquiry at the studio.
#[async_trait]
pub trait BookingSubmitter: Send + Sync {
    async fn deliver(&self, payload: &BookingPayload) -> Result<(), SubmitError>;
}

pub async fn submit(
    submitter: &dyn BookingSubmitter,
    submission: &BookingSubmission,
) -> Result<(), SubmitError> {
    let payload = BookingPayload::from_submission(submission);
    tracing::info!(
        product = %submission.package.id,
        date = %payload.date,
        times = %payload.time,
        "submitting booking"
    );

    let result = submitter.deliver(&payload).await;
    match &result {
        Ok(()) => tracing::info!(product = %submission.package.id, "booking submitted"),
        Err(e) => tracing::error!(error = %e, "booking submission failed"),
    }
    result
}
