use serde::{Deserialize, Serialize};

use super::package::{LocalizedText, Package};

pub const PACKAGES_KEY: &str = "packages";
pub const NOTICE_KEY: &str = "notice";
pub const FAQS_KEY: &str = "faqs";
pub const REVIEWS_KEY: &str = "reviews";
pub const CHAT_CONTEXT_KEY: &str = "chat_context";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqEntry {
    pub question: LocalizedText,
    pub answer: LocalizedText,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub author: String,
    pub text: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
}

fn default_rating() -> u8 {
    5
}

/// Read-only copy of the site content handed to the FAQ assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteContent {
    pub packages: Vec<Package>,
    pub faqs: Vec<FaqEntry>,
    pub notice: Option<LocalizedText>,
    pub reviews: Vec<Review>,
}
