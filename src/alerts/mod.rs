pub mod cooldown;
pub mod runner;
pub mod speaker;

pub use cooldown::{CooldownStore, CooldownWindow};
pub use runner::{AlertRunner, CheckOutcome};
pub use speaker::{AlexaRemoteControl, SpeakError, Speaker};
