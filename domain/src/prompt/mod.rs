//! Prompt domain
//!
//! Prompt builders for the moderator and the speakers. Every builder names
//! its output keys through the schema constants so prompts and parsing
//! cannot drift apart.

pub mod moderator;
pub mod speaker;

pub use moderator::ModeratorPrompt;
pub use speaker::SpeakerPrompt;
