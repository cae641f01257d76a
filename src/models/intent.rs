use serde::{Deserialize, Serialize};

/// Normalized meaning of one turn's input, drawn from a closed set.
///
/// `Unrecognized` is a first-class outcome, not an error: every state that
/// gathers input handles it (usually by re-prompting).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Refill,
    Information,
    Pharmacist,
    AskMore,
    AskAnother,
    ReturnToMenu,
    Affirm,
    Decline,
    Unrecognized,
}
