use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Date,
    Time,
    Location,
    Product,
    LikedPhotosReview,
    Details,
    Confirmation,
    Submitting,
    SubmitFailed,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Date => "date",
            WizardStep::Time => "time",
            WizardStep::Location => "location",
            WizardStep::Product => "product",
            WizardStep::LikedPhotosReview => "liked_photos_review",
            WizardStep::Details => "details",
            WizardStep::Confirmation => "confirmation",
            WizardStep::Submitting => "submitting",
            WizardStep::SubmitFailed => "submit_failed",
        }
    }

    /// The step `back` returns to. `Submitting` has none: an in-flight
    /// submission cannot be walked away from.
    pub fn predecessor(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Date | WizardStep::Submitting => None,
            WizardStep::Time => Some(WizardStep::Date),
            WizardStep::Location => Some(WizardStep::Time),
            WizardStep::Product => Some(WizardStep::Location),
            WizardStep::LikedPhotosReview => Some(WizardStep::Product),
            WizardStep::Details => Some(WizardStep::LikedPhotosReview),
            WizardStep::Confirmation => Some(WizardStep::Details),
            WizardStep::SubmitFailed => Some(WizardStep::Confirmation),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Instagram handle or KakaoTalk ID.
    #[serde(default)]
    pub contact_id: String,
    #[serde(default = "default_people_count")]
    pub people_count: u32,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub outfit: String,
    #[serde(default)]
    pub message: String,
}

fn default_people_count() -> u32 {
    1
}

impl ClientDetails {
    pub fn has_contact(&self) -> bool {
        !self.email.trim().is_empty() || !self.contact_id.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.has_contact() && self.people_count >= 1
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingDraft {
    pub date: Option<NaiveDate>,
    pub times: Vec<String>,
    pub locations: Vec<String>,
    pub product_id: Option<String>,
    pub liked_photo_refs: Vec<String>,
    pub client: ClientDetails,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self {
            client: ClientDetails {
                people_count: 1,
                ..ClientDetails::default()
            },
            ..Self::default()
        }
    }

    pub fn toggle_time(&mut self, time: &str) -> bool {
        toggle(&mut self.times, time)
    }

    pub fn toggle_location(&mut self, location: &str) -> bool {
        toggle(&mut self.locations, location)
    }
}

/// Removes `value` if present, otherwise appends it. Returns whether it is now selected.
fn toggle(list: &mut Vec<String>, value: &str) -> bool {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
        false
    } else {
        list.push(value.to_string());
        true
    }
}
