use serde::{Deserialize, Serialize};

use crate::models::CallSession;

/// Dialogue states. `Hangup` is the terminal success state,
/// `PharmacistTransfer` the terminal escalation state; every other state is
/// part of the menu, information, or refill branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StateId {
    Greeting,
    MainMenu,
    InfoSummary,
    InfoMoreOffer,
    FaqCapture,
    FaqAnswered,
    FaqFollowup,
    RefillIntro,
    NameCapture,
    DobCapture,
    RxNumberCapture,
    RefillResult,
    PostRefillOptions,
    PharmacistTransfer,
    Hangup,
}

impl StateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateId::Greeting => "greeting",
            StateId::MainMenu => "main_menu",
            StateId::InfoSummary => "info_summary",
            StateId::InfoMoreOffer => "info_more_offer",
            StateId::FaqCapture => "faq_capture",
            StateId::FaqAnswered => "faq_answered",
            StateId::FaqFollowup => "faq_followup",
            StateId::RefillIntro => "refill_intro",
            StateId::NameCapture => "name_capture",
            StateId::DobCapture => "dob_capture",
            StateId::RxNumberCapture => "rx_number_capture",
            StateId::RefillResult => "refill_result",
            StateId::PostRefillOptions => "post_refill_options",
            StateId::PharmacistTransfer => "pharmacist_transfer",
            StateId::Hangup => "hangup",
        }
    }

    /// Parse a state id arriving from the transport. `None` for anything
    /// unknown — the transport is untrusted, so no lenient fallback here.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "greeting" => Some(StateId::Greeting),
            "main_menu" => Some(StateId::MainMenu),
            "info_summary" => Some(StateId::InfoSummary),
            "info_more_offer" => Some(StateId::InfoMoreOffer),
            "faq_capture" => Some(StateId::FaqCapture),
            "faq_answered" => Some(StateId::FaqAnswered),
            "faq_followup" => Some(StateId::FaqFollowup),
            "refill_intro" => Some(StateId::RefillIntro),
            "name_capture" => Some(StateId::NameCapture),
            "dob_capture" => Some(StateId::DobCapture),
            "rx_number_capture" => Some(StateId::RxNumberCapture),
            "refill_result" => Some(StateId::RefillResult),
            "post_refill_options" => Some(StateId::PostRefillOptions),
            "pharmacist_transfer" => Some(StateId::PharmacistTransfer),
            "hangup" => Some(StateId::Hangup),
            _ => None,
        }
    }
}

/// How the transport should capture the caller's next turn: which input
/// modes to accept, how long to wait, and which state (plus session token)
/// the result must be delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSpec {
    pub speech: bool,
    pub dtmf: bool,
    pub timeout_secs: u32,
    pub deliver_to: StateId,
}

impl CaptureSpec {
    pub fn speech_only(timeout_secs: u32, deliver_to: StateId) -> Self {
        Self {
            speech: true,
            dtmf: false,
            timeout_secs,
            deliver_to,
        }
    }

    pub fn speech_and_dtmf(timeout_secs: u32, deliver_to: StateId) -> Self {
        Self {
            speech: true,
            dtmf: true,
            timeout_secs,
            deliver_to,
        }
    }
}

/// The state machine's output for one turn: the state entered, the lines to
/// speak, the capture instruction for the next turn (absent when terminal),
/// and the session to thread forward.
#[derive(Debug, Clone)]
pub struct DialogueStep {
    pub next_state: StateId,
    pub prompt: Vec<String>,
    pub capture: Option<CaptureSpec>,
    pub session: CallSession,
    /// Number to dial after speaking, for the pharmacist transfer.
    pub dial: Option<String>,
    pub terminal: bool,
}

impl DialogueStep {
    pub fn terminal_hangup(prompt: Vec<String>, session: CallSession) -> Self {
        Self {
            next_state: StateId::Hangup,
            prompt,
            capture: None,
            session,
            dial: None,
            terminal: true,
        }
    }

    pub fn terminal_transfer(
        prompt: Vec<String>,
        session: CallSession,
        transfer_number: &str,
    ) -> Self {
        Self {
            next_state: StateId::PharmacistTransfer,
            prompt,
            capture: None,
            session,
            dial: Some(transfer_number.to_string()),
            terminal: true,
        }
    }
}

/// Outcome tag from the refill submission gateway. The dialogue engine only
/// routes on the tag; every non-approval collapses to the same escalation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefillOutcome {
    Approved { pickup_eta: String },
    TooSoon,
    Expired,
    NoRefillsRemaining,
    VerificationFailed,
    GatewayUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id_round_trip() {
        for state in [
            StateId::Greeting,
            StateId::MainMenu,
            StateId::FaqCapture,
            StateId::RxNumberCapture,
            StateId::Hangup,
        ] {
            assert_eq!(StateId::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_state_id_rejects_unknown() {
        assert_eq!(StateId::parse("no_such_state"), None);
        assert_eq!(StateId::parse(""), None);
    }

    #[test]
    fn test_refill_outcome_tag_format() {
        let outcome: RefillOutcome =
            serde_json::from_str(r#"{"status":"too_soon"}"#).unwrap();
        assert_eq!(outcome, RefillOutcome::TooSoon);

        let approved: RefillOutcome = serde_json::from_str(
            r#"{"status":"approved","pickup_eta":"tomorrow after 2pm"}"#,
        )
        .unwrap();
        assert!(matches!(approved, RefillOutcome::Approved { .. }));
    }
}
