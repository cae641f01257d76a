use crate::config::AppConfig;
use crate::models::{CallSession, CaptureSpec, DialogueStep, Intent, RefillOutcome, StateId};
use crate::services::ai::{AnswerPolicy, AnswerProvider};
use crate::services::interpreter;
use crate::services::records::RecordsProvider;

/// Raw caller signal for one turn, as delivered by the transport. Both
/// fields absent means the capture window elapsed in silence.
#[derive(Debug, Default, Clone, Copy)]
pub struct TurnInput<'a> {
    pub free_text: Option<&'a str>,
    pub keypress: Option<&'a str>,
}

const MENU_TIMEOUT: u32 = 3;
const INFO_OFFER_TIMEOUT: u32 = 2;
const FAQ_FOLLOWUP_TIMEOUT: u32 = 2;
const CAPTURE_TIMEOUT: u32 = 5;
const POST_REFILL_TIMEOUT: u32 = 3;

/// First step of every call: greet the caller and open the main menu.
pub fn greeting_step(config: &AppConfig) -> DialogueStep {
    let prompt = vec![
        format!(
            "Welcome to {}. This call may be recorded for quality and training purposes.",
            config.pharmacy.name
        ),
        main_menu_prompt(),
    ];
    DialogueStep {
        next_state: StateId::Greeting,
        prompt,
        capture: Some(CaptureSpec::speech_and_dtmf(MENU_TIMEOUT, StateId::MainMenu)),
        session: CallSession::default(),
        dial: None,
        terminal: false,
    }
}

/// Advance the call by one turn. Never fails: gateway errors and anything
/// else unexpected resolve to a pharmacist transfer inside the flow.
pub async fn handle_turn(
    config: &AppConfig,
    ai: &dyn AnswerProvider,
    records: &dyn RecordsProvider,
    state: StateId,
    session: CallSession,
    input: TurnInput<'_>,
) -> DialogueStep {
    let intent = interpreter::interpret(state, input.free_text, input.keypress);
    tracing::info!(
        state = state.as_str(),
        intent = ?intent,
        "processing turn"
    );

    match state {
        // The greeting never gathers, but a stale transport callback may
        // still land here. Treat it as a fresh menu.
        StateId::Greeting => menu_step(Vec::new(), session),

        StateId::MainMenu => match intent {
            Some(Intent::Refill) => refill_intro_step(session),
            Some(Intent::Information) => info_summary_step(config, session),
            Some(Intent::Pharmacist) => transfer_step(
                config,
                session,
                vec!["Transferring you to a pharmacist. Please hold.".to_string()],
            ),
            Some(_) => menu_step(
                vec!["I did not understand your response.".to_string()],
                session,
            ),
            None => menu_step(Vec::new(), session),
        },

        StateId::InfoSummary | StateId::InfoMoreOffer => match intent {
            Some(Intent::AskMore) => faq_capture_step(session),
            _ => menu_step(Vec::new(), session),
        },

        StateId::FaqCapture => match input.free_text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(question) => answer_question(config, ai, session, question).await,
            None => menu_step(
                vec!["I didn't catch that. Let me take you back to the main menu.".to_string()],
                session,
            ),
        },

        StateId::FaqAnswered | StateId::FaqFollowup => match intent {
            Some(Intent::AskAnother) => faq_capture_step(session),
            _ => menu_step(Vec::new(), session),
        },

        StateId::RefillIntro | StateId::NameCapture => {
            match input.free_text.map(str::trim).filter(|t| !t.is_empty()) {
                Some(name) => {
                    let session = CallSession {
                        caller_name: Some(name.to_string()),
                        ..session
                    };
                    DialogueStep {
                        next_state: StateId::DobCapture,
                        prompt: vec![
                            "Thank you. Please say or enter your date of birth in month, \
                             day, year format. For example, January 1st, 1980."
                                .to_string(),
                        ],
                        capture: Some(CaptureSpec::speech_and_dtmf(
                            CAPTURE_TIMEOUT,
                            StateId::DobCapture,
                        )),
                        session,
                        dial: None,
                        terminal: false,
                    }
                }
                None => no_response_transfer(config, session),
            }
        }

        StateId::DobCapture => {
            // Dates of birth arrive by voice or keypad.
            let dob = input
                .free_text
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .or_else(|| input.keypress.map(str::trim).filter(|d| !d.is_empty()));
            match dob {
                Some(dob) => {
                    let session = CallSession {
                        date_of_birth: Some(dob.to_string()),
                        ..session
                    };
                    verify_and_ask_rx(config, records, session).await
                }
                None => no_response_transfer(config, session),
            }
        }

        StateId::RxNumberCapture => {
            let rx = input
                .keypress
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .or_else(|| input.free_text.map(str::trim).filter(|t| !t.is_empty()));
            match rx {
                Some(rx) => {
                    let session = CallSession {
                        rx_number: Some(rx.to_string()),
                        ..session
                    };
                    submit_refill(config, records, session).await
                }
                // Unlike the identity captures, silence here re-prompts: the
                // caller is already verified and just needs another chance.
                None => rx_capture_step(
                    vec!["I didn't catch that.".to_string()],
                    session,
                ),
            }
        }

        StateId::RefillResult | StateId::PostRefillOptions => match intent {
            Some(Intent::Affirm) => menu_step(Vec::new(), session),
            _ => goodbye_step(config, session),
        },

        // Terminal states are idempotent: a replayed callback gets the same
        // terminal step again.
        StateId::PharmacistTransfer => transfer_step(
            config,
            session,
            vec!["Transferring you to a pharmacist. Please hold.".to_string()],
        ),
        StateId::Hangup => goodbye_step(config, session),
    }
}

fn main_menu_prompt() -> String {
    "For prescription refills, say refill or press 1. \
     For store hours and information, say information or press 2. \
     To speak with a pharmacist, say pharmacist or press 0."
        .to_string()
}

fn menu_step(mut prompt: Vec<String>, session: CallSession) -> DialogueStep {
    prompt.push(main_menu_prompt());
    DialogueStep {
        next_state: StateId::MainMenu,
        prompt,
        capture: Some(CaptureSpec::speech_and_dtmf(MENU_TIMEOUT, StateId::MainMenu)),
        session,
        dial: None,
        terminal: false,
    }
}

fn info_summary_step(config: &AppConfig, session: CallSession) -> DialogueStep {
    DialogueStep {
        next_state: StateId::InfoSummary,
        prompt: vec![
            format!(
                "{} is located at {}. Our hours are {}.",
                config.pharmacy.name, config.pharmacy.address, config.pharmacy.hours
            ),
            "For more information, say more or press 1. \
             To return to the main menu, say menu or press 2."
                .to_string(),
        ],
        capture: Some(CaptureSpec::speech_and_dtmf(
            INFO_OFFER_TIMEOUT,
            StateId::InfoMoreOffer,
        )),
        session,
        dial: None,
        terminal: false,
    }
}

fn faq_capture_step(session: CallSession) -> DialogueStep {
    DialogueStep {
        next_state: StateId::FaqCapture,
        prompt: vec!["What would you like to know about our pharmacy?".to_string()],
        capture: Some(CaptureSpec::speech_only(CAPTURE_TIMEOUT, StateId::FaqCapture)),
        session,
        dial: None,
        terminal: false,
    }
}

async fn answer_question(
    config: &AppConfig,
    ai: &dyn AnswerProvider,
    session: CallSession,
    question: &str,
) -> DialogueStep {
    let policy = AnswerPolicy::for_pharmacy(&config.pharmacy.name);
    match ai.answer(question, &policy).await {
        Ok(answer) => DialogueStep {
            next_state: StateId::FaqAnswered,
            prompt: vec![
                answer,
                "Would you like to ask another question or return to the main menu? \
                 Say question or press 1 for another question. \
                 Say menu or press 2 to return to the main menu."
                    .to_string(),
            ],
            capture: Some(CaptureSpec::speech_and_dtmf(
                FAQ_FOLLOWUP_TIMEOUT,
                StateId::FaqFollowup,
            )),
            session,
            dial: None,
            terminal: false,
        },
        Err(e) => {
            tracing::warn!(error = %e, "answer gateway failed, transferring");
            transfer_step(
                config,
                session,
                vec![
                    "I apologize, but I'm having trouble answering your question \
                     right now. Let me connect you with a pharmacist who can help."
                        .to_string(),
                ],
            )
        }
    }
}

fn refill_intro_step(session: CallSession) -> DialogueStep {
    DialogueStep {
        next_state: StateId::RefillIntro,
        prompt: vec![
            "To request a prescription refill, I'll need to verify your identity."
                .to_string(),
            "Please say your full name.".to_string(),
        ],
        capture: Some(CaptureSpec::speech_only(CAPTURE_TIMEOUT, StateId::NameCapture)),
        session,
        dial: None,
        terminal: false,
    }
}

async fn verify_and_ask_rx(
    config: &AppConfig,
    records: &dyn RecordsProvider,
    session: CallSession,
) -> DialogueStep {
    let (name, dob) = match (&session.caller_name, &session.date_of_birth) {
        (Some(name), Some(dob)) => (name.clone(), dob.clone()),
        // A forged or truncated token can reach this state without the
        // earlier captures. Escalate rather than guess.
        _ => {
            tracing::warn!("identity fields missing at verification, transferring");
            return transfer_step(
                config,
                session,
                vec!["Transferring you to a pharmacist. Please hold.".to_string()],
            );
        }
    };

    match records.verify_identity(&name, &dob).await {
        Ok(true) => rx_capture_step(
            vec![format!("Thank you for verifying your identity, {name}.")],
            session,
        ),
        Ok(false) => transfer_step(
            config,
            session,
            vec![
                "I'm having trouble verifying your information. \
                 Let me transfer you to a pharmacist who can help."
                    .to_string(),
            ],
        ),
        Err(e) => {
            tracing::warn!(error = %e, "identity verification failed, transferring");
            transfer_step(
                config,
                session,
                vec![
                    "I'm having trouble verifying your information. \
                     Let me transfer you to a pharmacist who can help."
                        .to_string(),
                ],
            )
        }
    }
}

async fn submit_refill(
    config: &AppConfig,
    records: &dyn RecordsProvider,
    session: CallSession,
) -> DialogueStep {
    let (name, dob, rx) = match (
        &session.caller_name,
        &session.date_of_birth,
        &session.rx_number,
    ) {
        (Some(name), Some(dob), Some(rx)) => (name.clone(), dob.clone(), rx.clone()),
        _ => {
            tracing::warn!("session fields missing at refill submission, transferring");
            return transfer_step(
                config,
                session,
                vec!["Transferring you to a pharmacist. Please hold.".to_string()],
            );
        }
    };

    let outcome = match records.submit_refill(&name, &dob, &rx).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "refill gateway failed");
            RefillOutcome::GatewayUnavailable
        }
    };

    match outcome {
        RefillOutcome::Approved { pickup_eta } => DialogueStep {
            next_state: StateId::RefillResult,
            prompt: vec![
                format!(
                    "Thank you. I've submitted a request to refill prescription \
                     number {rx}. Your refill should be ready for pickup {pickup_eta}. \
                     We'll send a text message when it's ready."
                ),
                "Is there anything else you need help with today? Say yes or press 1 \
                 for more options, or say no or press 2 to end the call."
                    .to_string(),
            ],
            capture: Some(CaptureSpec::speech_and_dtmf(
                POST_REFILL_TIMEOUT,
                StateId::PostRefillOptions,
            )),
            session,
            dial: None,
            terminal: false,
        },
        other => {
            tracing::info!(outcome = ?other, "refill not approved, transferring");
            transfer_step(
                config,
                session,
                vec![
                    "I'm sorry, but it looks like this prescription may not be \
                     eligible for refill at this time. Let me connect you with a \
                     pharmacist who can assist you further."
                        .to_string(),
                ],
            )
        }
    }
}

fn rx_capture_step(mut prompt: Vec<String>, session: CallSession) -> DialogueStep {
    prompt.push(
        "Please say or enter your prescription number. \
         You can find this on your prescription label."
            .to_string(),
    );
    DialogueStep {
        next_state: StateId::RxNumberCapture,
        prompt,
        capture: Some(CaptureSpec::speech_and_dtmf(
            CAPTURE_TIMEOUT,
            StateId::RxNumberCapture,
        )),
        session,
        dial: None,
        terminal: false,
    }
}

fn no_response_transfer(config: &AppConfig, session: CallSession) -> DialogueStep {
    transfer_step(
        config,
        session,
        vec![
            "I'm sorry, I didn't hear a response. \
             Let me transfer you to a pharmacist who can help."
                .to_string(),
        ],
    )
}

fn transfer_step(config: &AppConfig, session: CallSession, prompt: Vec<String>) -> DialogueStep {
    DialogueStep::terminal_transfer(prompt, session, &config.pharmacy.transfer_number)
}

fn goodbye_step(config: &AppConfig, session: CallSession) -> DialogueStep {
    DialogueStep::terminal_hangup(
        vec![format!(
            "Thank you for calling {}. Have a great day!",
            config.pharmacy.name
        )],
        session,
    )
}
