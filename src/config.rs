use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub booking_relay_url: String,
    pub locations: Vec<String>,
    pub krw_per_gbp: i64,
    pub llm_provider: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

pub const DEFAULT_LOCATIONS: &[&str] = &[
    "Tower Bridge",
    "Westminster",
    "Notting Hill",
    "Greenwich",
    "Hyde Park",
];

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "studiobook.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            booking_relay_url: env::var("BOOKING_RELAY_URL").unwrap_or_default(),
            locations: env::var("STUDIO_LOCATIONS")
                .ok()
                .map(|v| parse_locations(&v))
                .filter(|l| !l.is_empty())
                .unwrap_or_else(default_locations),
            krw_per_gbp: env::var("KRW_PER_GBP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1700),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "ollama".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
        }
    }
}

pub fn default_locations() -> Vec<String> {
    DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect()
}

fn parse_locations(raw: &str) -> Vec<String> {
    let mut locations: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !locations.iter().any(|l| l == name) {
            locations.push(name.to_string());
        }
    }
    locations
}
