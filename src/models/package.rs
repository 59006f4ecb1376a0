use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ko => "ko",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalizedText {
    pub en: String,
    #[serde(default)]
    pub ko: String,
}

impl LocalizedText {
    pub fn new(en: &str, ko: &str) -> Self {
        Self {
            en: en.to_string(),
            ko: ko.to_string(),
        }
    }

    /// Falls back to English when the requested translation is blank.
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ko if !self.ko.trim().is_empty() => &self.ko,
            _ => &self.en,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalizedList {
    #[serde(default)]
    pub en: Vec<String>,
    #[serde(default)]
    pub ko: Vec<String>,
}

impl LocalizedList {
    pub fn get(&self, locale: Locale) -> &[String] {
        match locale {
            Locale::Ko if !self.ko.is_empty() => &self.ko,
            _ => &self.en,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub id: String,
    pub title: LocalizedText,
    pub price: String,
    #[serde(default)]
    pub features: LocalizedList,
}

/// Packages offered when the content store has never been edited.
pub fn default_packages() -> Vec<Package> {
    vec![
        Package {
            id: "60min".to_string(),
            title: LocalizedText::new("60 Minute Session", "60분 촬영"),
            price: "£180 / ₩320,000".to_string(),
            features: LocalizedList {
                en: vec![
                    "1 location".to_string(),
                    "40+ edited photos".to_string(),
                ],
                ko: vec!["장소 1곳".to_string(), "보정본 40장 이상".to_string()],
            },
        },
        Package {
            id: "90min".to_string(),
            title: LocalizedText::new("90 Minute Session", "90분 촬영"),
            price: "£250 / ₩500,000".to_string(),
            features: LocalizedList {
                en: vec![
                    "Up to 2 locations".to_string(),
                    "70+ edited photos".to_string(),
                ],
                ko: vec!["장소 최대 2곳".to_string(), "보정본 70장 이상".to_string()],
            },
        },
        Package {
            id: "120min".to_string(),
            title: LocalizedText::new("120 Minute Session", "120분 촬영"),
            price: "£320 / ₩640,000".to_string(),
            features: LocalizedList {
                en: vec![
                    "Up to 3 locations".to_string(),
                    "100+ edited photos".to_string(),
                    "Outfit change".to_string(),
                ],
                ko: vec![
                    "장소 최대 3곳".to_string(),
                    "보정본 100장 이상".to_string(),
                    "의상 교체".to_string(),
                ],
            },
        },
    ]
}
