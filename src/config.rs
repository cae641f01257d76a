use std::env;

/// Static pharmacy facts spoken to callers. Built once at startup and never
/// mutated; handed to components through `AppState`.
#[derive(Clone, Debug)]
pub struct PharmacyInfo {
    pub name: String,
    pub hours: String,
    pub address: String,
    /// Number dialed when escalating to a human pharmacist.
    pub transfer_number: String,
}

impl Default for PharmacyInfo {
    fn default() -> Self {
        Self {
            name: "Community Health Pharmacy".to_string(),
            hours: "Monday to Friday: 9am to 7pm, Saturday: 9am to 5pm, Sunday: Closed"
                .to_string(),
            address: "123 Main Street, Anytown, USA".to_string(),
            transfer_number: "(555) 123-4567".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub pharmacy: PharmacyInfo,
    /// TTS voice passed through to the telephony provider.
    pub voice: String,
    pub llm_provider: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub ollama_url: String,
    pub records_api_url: String,
    pub records_api_key: String,
    pub twilio_auth_token: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            pharmacy: PharmacyInfo {
                name: env::var("PHARMACY_NAME")
                    .unwrap_or_else(|_| PharmacyInfo::default().name),
                hours: env::var("PHARMACY_HOURS")
                    .unwrap_or_else(|_| PharmacyInfo::default().hours),
                address: env::var("PHARMACY_ADDRESS")
                    .unwrap_or_else(|_| PharmacyInfo::default().address),
                transfer_number: env::var("PHARMACY_TRANSFER_NUMBER")
                    .unwrap_or_else(|_| PharmacyInfo::default().transfer_number),
            },
            voice: env::var("TTS_VOICE").unwrap_or_else(|_| "Polly.Joanna".to_string()),
            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            records_api_url: env::var("RECORDS_API_URL")
                .unwrap_or_else(|_| "https://api.libertysoftware.com".to_string()),
            records_api_key: env::var("RECORDS_API_KEY").unwrap_or_default(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pharmacy_defaults() {
        let info = PharmacyInfo::default();
        assert_eq!(info.name, "Community Health Pharmacy");
        assert!(info.hours.contains("Sunday: Closed"));
    }
}
