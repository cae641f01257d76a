use crate::models::{Intent, StateId};

/// One row of a menu's intent table: the intent, the keywords whose presence
/// in the transcript selects it, and the touch-tone digit mapped to it.
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    pub digit: Option<&'static str>,
}

const MAIN_MENU: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Refill,
        keywords: &["refill"],
        digit: Some("1"),
    },
    IntentRule {
        intent: Intent::Information,
        keywords: &["information", "hours"],
        digit: Some("2"),
    },
    IntentRule {
        intent: Intent::Pharmacist,
        keywords: &["pharmacist"],
        digit: Some("0"),
    },
];

const INFO_MORE_OFFER: &[IntentRule] = &[
    IntentRule {
        intent: Intent::AskMore,
        keywords: &["more"],
        digit: Some("1"),
    },
    IntentRule {
        intent: Intent::ReturnToMenu,
        keywords: &["menu"],
        digit: Some("2"),
    },
];

const FAQ_FOLLOWUP: &[IntentRule] = &[
    IntentRule {
        intent: Intent::AskAnother,
        keywords: &["question"],
        digit: Some("1"),
    },
    IntentRule {
        intent: Intent::ReturnToMenu,
        keywords: &["menu"],
        digit: Some("2"),
    },
];

const POST_REFILL: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Affirm,
        keywords: &["yes"],
        digit: Some("1"),
    },
    IntentRule {
        intent: Intent::Decline,
        keywords: &["no"],
        digit: Some("2"),
    },
];

/// Intents valid at a given state. States that capture verbatim text (name,
/// date of birth, prescription number, open question) have no table.
pub fn expected_intents(state: StateId) -> &'static [IntentRule] {
    match state {
        StateId::MainMenu => MAIN_MENU,
        StateId::InfoMoreOffer => INFO_MORE_OFFER,
        StateId::FaqFollowup => FAQ_FOLLOWUP,
        StateId::PostRefillOptions => POST_REFILL,
        _ => &[],
    }
}

/// Normalize one turn's raw signal into an intent.
///
/// A keypress matching a mapped digit wins outright over any transcript.
/// Otherwise the lower-cased transcript is tested for keyword containment —
/// a longer utterance containing the keyword still matches. Returns `None`
/// for silence (nothing delivered at all); unmatched input is
/// `Some(Unrecognized)`, never an error.
pub fn interpret(
    state: StateId,
    free_text: Option<&str>,
    keypress: Option<&str>,
) -> Option<Intent> {
    let rules = expected_intents(state);

    let text = free_text.map(str::trim).filter(|t| !t.is_empty());
    let digit = keypress.map(str::trim).filter(|d| !d.is_empty());

    if text.is_none() && digit.is_none() {
        return None;
    }

    if let Some(d) = digit {
        for rule in rules {
            if rule.digit == Some(d) {
                return Some(rule.intent);
            }
        }
    }

    if let Some(t) = text {
        let lower = t.to_lowercase();
        for rule in rules {
            if rule.keywords.iter().any(|k| lower.contains(k)) {
                return Some(rule.intent);
            }
        }
    }

    Some(Intent::Unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_containment() {
        assert_eq!(
            interpret(StateId::MainMenu, Some("I need a refill"), None),
            Some(Intent::Refill)
        );
        assert_eq!(
            interpret(StateId::MainMenu, Some("what are your HOURS"), None),
            Some(Intent::Information)
        );
    }

    #[test]
    fn test_digit_wins_over_conflicting_text() {
        assert_eq!(
            interpret(StateId::MainMenu, Some("I need a refill"), Some("2")),
            Some(Intent::Information)
        );
        assert_eq!(
            interpret(StateId::PostRefillOptions, Some("yes please"), Some("2")),
            Some(Intent::Decline)
        );
    }

    #[test]
    fn test_unmapped_digit_falls_back_to_text() {
        assert_eq!(
            interpret(StateId::MainMenu, Some("pharmacist please"), Some("9")),
            Some(Intent::Pharmacist)
        );
        assert_eq!(
            interpret(StateId::MainMenu, None, Some("9")),
            Some(Intent::Unrecognized)
        );
    }

    #[test]
    fn test_silence_is_distinct_from_unrecognized() {
        assert_eq!(interpret(StateId::MainMenu, None, None), None);
        assert_eq!(interpret(StateId::MainMenu, Some("   "), Some("")), None);
        assert_eq!(
            interpret(StateId::MainMenu, Some("banana"), None),
            Some(Intent::Unrecognized)
        );
    }

    #[test]
    fn test_context_scopes_keywords() {
        // "more" means nothing at the main menu.
        assert_eq!(
            interpret(StateId::MainMenu, Some("tell me more"), None),
            Some(Intent::Unrecognized)
        );
        assert_eq!(
            interpret(StateId::InfoMoreOffer, Some("tell me more"), None),
            Some(Intent::AskMore)
        );
    }
}
