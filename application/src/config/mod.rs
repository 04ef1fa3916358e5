//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`DiscussionParams`]: what one discussion session does
//! - [`RetryLimits`]: attempt ceilings for each recovery tier

pub mod discussion_params;
pub mod retry_limits;

pub use discussion_params::DiscussionParams;
pub use retry_limits::RetryLimits;
