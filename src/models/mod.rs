pub mod intent;
pub mod session;
pub mod step;

pub use intent::Intent;
pub use session::CallSession;
pub use step::{CaptureSpec, DialogueStep, RefillOutcome, StateId};
