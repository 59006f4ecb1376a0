pub mod availability;
pub mod booking;
pub mod content;
pub mod package;
pub mod pricing;

pub use availability::{DaySchedule, TimeSlot};
pub use booking::{BookingDraft, ClientDetails, WizardStep};
pub use content::{FaqEntry, Review, SiteContent};
pub use package::{Locale, LocalizedList, LocalizedText, Package};
pub use pricing::{CurrencyAmounts, PriceBreakdown};
