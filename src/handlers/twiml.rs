use crate::models::DialogueStep;

/// Render a dialogue step as a TwiML document.
///
/// Prompt lines before the last are spoken up front; the final line is
/// nested inside the `<Gather>` so the caller can barge in on the question
/// itself. A `<Redirect>` after the gather delivers silence back to the same
/// state as an empty turn.
pub fn render(step: &DialogueStep, voice: &str) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);

    match &step.capture {
        Some(capture) => {
            let action = format!(
                "/voice/turn?state={}&session={}",
                capture.deliver_to.as_str(),
                step.session.encode_token()
            );
            let (head, last) = match step.prompt.split_last() {
                Some((last, head)) => (head, Some(last)),
                None => (&step.prompt[..], None),
            };
            for line in head {
                push_say(&mut out, voice, line);
            }
            let input = if capture.dtmf { "speech dtmf" } else { "speech" };
            out.push_str(&format!(
                r#"<Gather input="{}" timeout="{}" action="{}" method="POST" speechModel="phone_call" speechTimeout="auto">"#,
                input,
                capture.timeout_secs,
                escape_xml(&action),
            ));
            if let Some(line) = last {
                push_say(&mut out, voice, line);
            }
            out.push_str("</Gather>");
            out.push_str(&format!(
                r#"<Redirect method="POST">{}</Redirect>"#,
                escape_xml(&action)
            ));
        }
        None => {
            for line in &step.prompt {
                push_say(&mut out, voice, line);
            }
            if let Some(number) = &step.dial {
                out.push_str(&format!("<Dial>{}</Dial>", escape_xml(number)));
            } else {
                out.push_str("<Hangup/>");
            }
        }
    }

    out.push_str("</Response>");
    out
}

fn push_say(out: &mut String, voice: &str, line: &str) {
    out.push_str(&format!(
        r#"<Say voice="{}">{}</Say>"#,
        escape_xml(voice),
        escape_xml(line)
    ));
}

fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallSession, CaptureSpec, DialogueStep, StateId};

    fn gathering_step() -> DialogueStep {
        DialogueStep {
            next_state: StateId::MainMenu,
            prompt: vec![
                "Welcome back.".to_string(),
                "Say refill or press 1.".to_string(),
            ],
            capture: Some(CaptureSpec::speech_and_dtmf(3, StateId::MainMenu)),
            session: CallSession::default(),
            dial: None,
            terminal: false,
        }
    }

    #[test]
    fn test_gather_attributes_and_action() {
        let xml = render(&gathering_step(), "Polly.Joanna");
        assert!(xml.contains(r#"<Gather input="speech dtmf" timeout="3""#));
        assert!(xml.contains(r#"speechModel="phone_call""#));
        assert!(xml.contains("action=\"/voice/turn?state=main_menu&amp;session="));
        // Announce line precedes the gather, question is nested inside it.
        let gather_pos = xml.find("<Gather").unwrap();
        assert!(xml.find("Welcome back.").unwrap() < gather_pos);
        assert!(xml.find("Say refill or press 1.").unwrap() > gather_pos);
        // Timeout falls through to a redirect at the same state.
        assert!(xml.contains("<Redirect method=\"POST\">/voice/turn?state=main_menu"));
    }

    #[test]
    fn test_say_text_is_escaped() {
        let mut step = gathering_step();
        step.prompt = vec!["Thank you, O'Brien & Sons <LLC>.".to_string()];
        let xml = render(&step, "Polly.Joanna");
        assert!(xml.contains("Thank you, O&apos;Brien &amp; Sons &lt;LLC&gt;."));
    }

    #[test]
    fn test_terminal_hangup_and_dial() {
        let hangup =
            DialogueStep::terminal_hangup(vec!["Goodbye.".to_string()], CallSession::default());
        let xml = render(&hangup, "Polly.Joanna");
        assert!(xml.contains("<Hangup/>"));
        assert!(!xml.contains("<Gather"));

        let transfer = DialogueStep::terminal_transfer(
            vec!["Please hold.".to_string()],
            CallSession::default(),
            "(555) 123-4567",
        );
        let xml = render(&transfer, "Polly.Joanna");
        assert!(xml.contains("<Dial>(555) 123-4567</Dial>"));
        assert!(!xml.contains("<Hangup/>"));
    }
}
