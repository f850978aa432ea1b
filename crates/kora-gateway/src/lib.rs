//! # Kora Gateway
//!
//! Outbound HTTP integrations, each behind an async trait so the node
//! can swap in mocks:
//!
//! | Module      | Upstream                 | Purpose                        |
//! |-------------|--------------------------|--------------------------------|
//! | `onramp`    | fiat on-ramp aggregator  | card/bank checkout into KOR    |
//! | `assistant` | chat completion API      | in-product staking assistant   |

pub mod assistant;
pub mod onramp;

pub use assistant::{AssistantClient, ChatTurn, HttpAssistantClient, MAX_HISTORY_TURNS};
pub use onramp::{CheckoutSession, HttpOnrampClient, OnrampClient, OnrampConfig};
