//! Services implementing the access-control flows on top of the repository
//! traits.

mod challenge;
mod mailer;

pub use challenge::{ChallengeConfig, ChallengeOutcome, ChallengeService, IssuedChallenge};
pub use mailer::AccessMailer;
