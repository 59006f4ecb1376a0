use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::models::availability::STUDIO_TIMEZONE;
use crate::models::{
    BookingDraft, ClientDetails, Locale, Package, PriceBreakdown, TimeSlot, WizardStep,
};
use crate::services::availability::{selectable_slots, AvailabilityRepository};
use crate::services::content::ContentRepository;
use crate::services::pricing::{self, Conversion};
use crate::services::submitter::SubmitError;

pub const MAX_LIKED_PHOTOS: usize = 50;
const MAX_LIKED_PHOTO_REF_CHARS: usize = 500;

/// Collaborators a wizard reads from. The wizard never writes to either store.
#[derive(Clone)]
pub struct WizardContext {
    pub availability: Arc<dyn AvailabilityRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub clock: Arc<dyn Clock>,
    pub locations: Vec<String>,
    pub conversion: Option<Conversion>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("not available at the {0} step")]
    WrongStep(&'static str),

    #[error("{0} is in the past")]
    DateInPast(NaiveDate),

    #[error("select a date first")]
    NoDate,

    #[error("select at least one time")]
    NoTimes,

    #[error("select at least one location")]
    NoLocations,

    #[error("select a package first")]
    NoProduct,

    #[error("a name and an email or contact ID are required")]
    MissingClientDetails,

    #[error("the {0} slot is not available")]
    SlotUnavailable(String),

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("unknown package: {0}")]
    UnknownProduct(String),

    #[error("at most 50 liked photos can be attached, got {0}")]
    TooManyLikedPhotos(usize),

    #[error("invalid liked photo reference: {0}")]
    InvalidLikedPhoto(String),

    #[error("already at the first step")]
    NoPreviousStep,

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("booking data unavailable: {0}")]
    Store(String),
}

impl WizardError {
    fn store(e: anyhow::Error) -> Self {
        WizardError::Store(format!("{e:#}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    SelectDate { date: NaiveDate },
    ToggleTime { time: String },
    ToggleLocation { location: String },
    SelectProduct { product_id: String },
    SetLikedPhotos { refs: Vec<String> },
    EnterDetails { client: ClientDetails },
    Next,
    Back,
    Retry,
}

/// Everything the relay needs, frozen at the moment the submission starts.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSubmission {
    pub draft: BookingDraft,
    pub package: Package,
    pub price: PriceBreakdown,
    pub locale: Locale,
}

#[derive(Debug)]
pub enum SubmitAttempt {
    Ready(BookingSubmission),
    /// Failed before reaching the transport; the wizard is already in `SubmitFailed`.
    Rejected(SubmitError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted { at: DateTime<Utc> },
    Failed(SubmitError),
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub step: WizardStep,
    pub locale: Locale,
    pub draft: BookingDraft,
    pub product_title: Option<String>,
    pub price: Option<PriceBreakdown>,
    pub can_advance: bool,
    pub can_go_back: bool,
    pub last_error: Option<String>,
    pub last_submitted_at: Option<DateTime<Utc>>,
}

/// Linear booking flow: date, time(s), location(s), package, liked photos,
/// client details, confirmation, submission.
pub struct BookingWizard {
    ctx: WizardContext,
    locale: Locale,
    client_offset: Option<FixedOffset>,
    step: WizardStep,
    draft: BookingDraft,
    last_error: Option<SubmitError>,
    last_submitted_at: Option<DateTime<Utc>>,
}

impl BookingWizard {
    /// `client_offset` is the visitor's UTC offset; it decides what "today" means
    /// for past-date checks. Without it the studio's own calendar day is used.
    pub fn new(ctx: WizardContext, locale: Locale, client_offset: Option<FixedOffset>) -> Self {
        Self {
            ctx,
            locale,
            client_offset,
            step: WizardStep::Date,
            draft: BookingDraft::new(),
            last_error: None,
            last_submitted_at: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        let now = self.ctx.clock.now();
        match self.client_offset {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.with_timezone(&STUDIO_TIMEZONE).date_naive(),
        }
    }

    pub fn apply(&mut self, action: WizardAction) -> Result<(), WizardError> {
        match action {
            WizardAction::SelectDate { date } => self.select_date(date),
            WizardAction::ToggleTime { time } => self.toggle_time(&time).map(|_| ()),
            WizardAction::ToggleLocation { location } => {
                self.toggle_location(&location).map(|_| ())
            }
            WizardAction::SelectProduct { product_id } => self.select_product(&product_id),
            WizardAction::SetLikedPhotos { refs } => self.set_liked_photos(refs),
            WizardAction::EnterDetails { client } => self.enter_details(client),
            WizardAction::Next => self.next(),
            WizardAction::Back => self.back(),
            WizardAction::Retry => self.retry(),
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Date)?;
        if date < self.today() {
            return Err(WizardError::DateInPast(date));
        }
        if self.draft.date != Some(date) {
            // slot validity depends on the date
            self.draft.times.clear();
            self.draft.date = Some(date);
        }
        self.transition(WizardStep::Time);
        Ok(())
    }

    /// Slots that can be picked for the draft's date at this moment.
    pub fn available_times(&self) -> Result<Vec<TimeSlot>, WizardError> {
        let date = self.draft.date.ok_or(WizardError::NoDate)?;
        selectable_slots(self.ctx.availability.as_ref(), date, self.ctx.clock.now())
            .map_err(WizardError::store)
    }

    /// Returns whether `time` is selected afterwards. Deselecting is always allowed;
    /// selecting requires the slot to be open now.
    pub fn toggle_time(&mut self, time: &str) -> Result<bool, WizardError> {
        self.expect_step(WizardStep::Time)?;
        if !self.draft.times.iter().any(|t| t == time)
            && !self.available_times()?.iter().any(|s| s.time == time)
        {
            return Err(WizardError::SlotUnavailable(time.to_string()));
        }
        Ok(self.draft.toggle_time(time))
    }

    pub fn toggle_location(&mut self, location: &str) -> Result<bool, WizardError> {
        self.expect_step(WizardStep::Location)?;
        if !self.draft.locations.iter().any(|l| l == location)
            && !self.ctx.locations.iter().any(|l| l == location)
        {
            return Err(WizardError::UnknownLocation(location.to_string()));
        }
        Ok(self.draft.toggle_location(location))
    }

    pub fn select_product(&mut self, product_id: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Product)?;
        if self.package(product_id)?.is_none() {
            return Err(WizardError::UnknownProduct(product_id.to_string()));
        }
        self.draft.product_id = Some(product_id.to_string());
        self.transition(WizardStep::LikedPhotosReview);
        Ok(())
    }

    /// Replaces the photos the visitor marked while browsing the portfolio.
    pub fn set_liked_photos(&mut self, refs: Vec<String>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::LikedPhotosReview)?;
        self.draft.liked_photo_refs = clean_liked_photo_refs(refs)?;
        Ok(())
    }

    /// Seeds the draft with the visitor's liked photos when a session starts.
    pub fn with_liked_photos(mut self, refs: Vec<String>) -> Result<Self, WizardError> {
        self.draft.liked_photo_refs = clean_liked_photo_refs(refs)?;
        Ok(self)
    }

    /// Stores the details as entered, then moves to confirmation if they are complete.
    pub fn enter_details(&mut self, client: ClientDetails) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details)?;
        self.draft.client = client;
        if !self.draft.client.is_complete() {
            return Err(WizardError::MissingClientDetails);
        }
        self.transition(WizardStep::Confirmation);
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), WizardError> {
        let target = self.advance_target()?;
        self.transition(target);
        Ok(())
    }

    pub fn can_advance(&self) -> bool {
        self.advance_target().is_ok()
    }

    fn advance_target(&self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::Date => {
                let date = self.draft.date.ok_or(WizardError::NoDate)?;
                if date < self.today() {
                    return Err(WizardError::DateInPast(date));
                }
                Ok(WizardStep::Time)
            }
            WizardStep::Time if self.draft.times.is_empty() => Err(WizardError::NoTimes),
            WizardStep::Time => Ok(WizardStep::Location),
            WizardStep::Location if self.draft.locations.is_empty() => {
                Err(WizardError::NoLocations)
            }
            WizardStep::Location => Ok(WizardStep::Product),
            WizardStep::Product if self.draft.product_id.is_none() => Err(WizardError::NoProduct),
            WizardStep::Product => Ok(WizardStep::LikedPhotosReview),
            WizardStep::LikedPhotosReview => Ok(WizardStep::Details),
            WizardStep::Details if !self.draft.client.is_complete() => {
                Err(WizardError::MissingClientDetails)
            }
            WizardStep::Details => Ok(WizardStep::Confirmation),
            WizardStep::Submitting => Err(WizardError::SubmissionInFlight),
            WizardStep::Confirmation | WizardStep::SubmitFailed => {
                Err(WizardError::WrongStep(self.step.as_str()))
            }
        }
    }

    /// Steps back one state. Nothing already entered is discarded.
    pub fn back(&mut self) -> Result<(), WizardError> {
        match self.step.predecessor() {
            Some(previous) => {
                if self.step == WizardStep::SubmitFailed {
                    self.last_error = None;
                }
                self.transition(previous);
                Ok(())
            }
            None if self.step == WizardStep::Submitting => Err(WizardError::SubmissionInFlight),
            None => Err(WizardError::NoPreviousStep),
        }
    }

    pub fn retry(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::SubmitFailed)?;
        self.last_error = None;
        self.transition(WizardStep::Confirmation);
        Ok(())
    }

    /// Moves `Confirmation` to `Submitting` and freezes the booking for the relay.
    /// Only one submission can be in flight: a second call is refused until
    /// [`BookingWizard::finish_submit`] settles the first.
    pub fn begin_submit(&mut self) -> Result<SubmitAttempt, WizardError> {
        match self.step {
            WizardStep::Confirmation => {}
            WizardStep::Submitting => return Err(WizardError::SubmissionInFlight),
            other => return Err(WizardError::WrongStep(other.as_str())),
        }

        let product_id = self.draft.product_id.clone().ok_or(WizardError::NoProduct)?;
        let package = self
            .package(&product_id)?
            .ok_or(WizardError::UnknownProduct(product_id))?;
        if self.draft.times.is_empty() {
            return Err(WizardError::NoTimes);
        }
        if self.draft.locations.is_empty() {
            return Err(WizardError::NoLocations);
        }
        if !self.draft.client.is_complete() {
            return Err(WizardError::MissingClientDetails);
        }

        let open = self.available_times()?;
        let stale: Vec<String> = self
            .draft
            .times
            .iter()
            .filter(|t| !open.iter().any(|s| &s.time == *t))
            .cloned()
            .collect();
        if !stale.is_empty() {
            let error = SubmitError::AvailabilityStale(stale);
            tracing::warn!(error = %error, "selected slots closed before submission");
            self.last_error = Some(error.clone());
            self.transition(WizardStep::SubmitFailed);
            return Ok(SubmitAttempt::Rejected(error));
        }

        let price = self.price_for(&package);
        self.transition(WizardStep::Submitting);
        Ok(SubmitAttempt::Ready(BookingSubmission {
            draft: self.draft.clone(),
            package,
            price,
            locale: self.locale,
        }))
    }

    /// Settles the in-flight submission. Success clears the draft and starts over
    /// at an empty `Date` step; failure keeps everything for a retry.
    pub fn finish_submit(
        &mut self,
        result: Result<(), SubmitError>,
    ) -> Result<SubmitOutcome, WizardError> {
        self.expect_step(WizardStep::Submitting)?;
        match result {
            Ok(()) => {
                let at = self.ctx.clock.now();
                self.draft = BookingDraft::new();
                self.last_error = None;
                self.last_submitted_at = Some(at);
                self.transition(WizardStep::Date);
                Ok(SubmitOutcome::Submitted { at })
            }
            Err(error) => {
                self.last_error = Some(error.clone());
                self.transition(WizardStep::SubmitFailed);
                Ok(SubmitOutcome::Failed(error))
            }
        }
    }

    pub fn price(&self) -> Result<Option<PriceBreakdown>, WizardError> {
        let Some(id) = self.draft.product_id.as_deref() else {
            return Ok(None);
        };
        Ok(self.package(id)?.map(|p| self.price_for(&p)))
    }

    pub fn snapshot(&self) -> Result<WizardSnapshot, WizardError> {
        let package = match self.draft.product_id.as_deref() {
            Some(id) => self.package(id)?,
            None => None,
        };
        Ok(WizardSnapshot {
            step: self.step,
            locale: self.locale,
            draft: self.draft.clone(),
            product_title: package
                .as_ref()
                .map(|p| p.title.get(self.locale).to_string()),
            price: package.as_ref().map(|p| self.price_for(p)),
            can_advance: self.can_advance(),
            can_go_back: self.step.predecessor().is_some(),
            last_error: self.last_error.as_ref().map(ToString::to_string),
            last_submitted_at: self.last_submitted_at,
        })
    }

    fn price_for(&self, package: &Package) -> PriceBreakdown {
        pricing::resolve_with(&package.price, self.ctx.conversion.as_ref())
    }

    fn package(&self, id: &str) -> Result<Option<Package>, WizardError> {
        self.ctx.content.package(id).map_err(WizardError::store)
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        match self.step {
            step if step == expected => Ok(()),
            WizardStep::Submitting => Err(WizardError::SubmissionInFlight),
            step => Err(WizardError::WrongStep(step.as_str())),
        }
    }

    fn transition(&mut self, to: WizardStep) {
        if self.step != to {
            tracing::debug!(from = self.step.as_str(), to = to.as_str(), "wizard transition");
            self.step = to;
        }
    }
}

/// Trims references, drops blanks and repeats, and keeps the visitor's order.
fn clean_liked_photo_refs(refs: Vec<String>) -> Result<Vec<String>, WizardError> {
    let mut cleaned: Vec<String> = Vec::with_capacity(refs.len());
    for raw in refs {
        let r = raw.trim();
        if r.is_empty() || cleaned.iter().any(|c| c == r) {
            continue;
        }
        if r.chars().count() > MAX_LIKED_PHOTO_REF_CHARS || r.chars().any(char::is_control) {
            return Err(WizardError::InvalidLikedPhoto(r.chars().take(40).collect()));
        }
        cleaned.push(r.to_string());
    }
    if cleaned.len() > MAX_LIKED_PHOTOS {
        return Err(WizardError::TooManyLikedPhotos(cleaned.len()));
    }
    Ok(cleaned)
}
