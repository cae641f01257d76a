pub mod ollama;
pub mod openai;

use async_trait::async_trait;

/// Constraints applied to every AI-generated answer: persona framing, content
/// prohibitions, and a length ceiling of roughly 30 seconds of speech.
#[derive(Debug, Clone)]
pub struct AnswerPolicy {
    pub pharmacy_name: String,
    pub max_tokens: u32,
}

impl AnswerPolicy {
    pub fn for_pharmacy(pharmacy_name: &str) -> Self {
        Self {
            pharmacy_name: pharmacy_name.to_string(),
            max_tokens: 150,
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are a helpful pharmacy assistant AI for {}. \
             Provide brief, accurate information about pharmacy services, \
             general medication information, and store policies. \
             Do not provide medical advice or discuss specific medications. \
             Keep responses under 30 seconds of spoken text. \
             Don't discuss prices or insurance details.",
            self.pharmacy_name
        )
    }
}

/// The AI answer gateway. Invoked synchronously from the FAQ state only; any
/// failure escalates the call to a pharmacist with no retry.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn answer(&self, question: &str, policy: &AnswerPolicy) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_prompt_carries_prohibitions() {
        let policy = AnswerPolicy::for_pharmacy("Community Health Pharmacy");
        let prompt = policy.system_prompt();
        assert!(prompt.contains("Community Health Pharmacy"));
        assert!(prompt.contains("Do not provide medical advice"));
        assert!(prompt.contains("prices or insurance"));
        assert_eq!(policy.max_tokens, 150);
    }
}
