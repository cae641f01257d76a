use base64::Engine;
use serde::{Deserialize, Serialize};

/// Per-call state carried between turns.
///
/// The transport is stateless: this struct rides along as an opaque
/// continuation token on each capture instruction and comes back verbatim on
/// the next turn. Fields are filled one per state, in order (name, then date
/// of birth, then prescription number), and never overwritten downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_number: Option<String>,
}

impl CallSession {
    /// Encode as a URL-safe continuation token. Base64 over the JSON
    /// encoding, so reserved characters in names survive the round trip.
    pub fn encode_token(&self) -> String {
        let json = serde_json::to_vec(self).expect("CallSession serialization cannot fail");
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a continuation token. The token crosses an untrusted transport
    /// boundary, so anything malformed is an error, not a panic.
    pub fn decode_token(token: &str) -> anyhow::Result<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(token)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
