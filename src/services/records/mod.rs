pub mod liberty;

use async_trait::async_trait;

use crate::models::RefillOutcome;

/// The pharmacy records system. Both operations are synchronous within a
/// turn and may fail; the dialogue engine maps any failure to a pharmacist
/// transfer without retrying. `submit_refill` is expected to be idempotent
/// per prescription number — the engine submits at most once per turn.
#[async_trait]
pub trait RecordsProvider: Send + Sync {
    async fn verify_identity(&self, name: &str, date_of_birth: &str) -> anyhow::Result<bool>;

    async fn submit_refill(
        &self,
        name: &str,
        date_of_birth: &str,
        rx_number: &str,
    ) -> anyhow::Result<RefillOutcome>;
}
