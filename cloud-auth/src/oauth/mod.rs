//! OAuth 2.0 sign-in infrastructure.
//!
//! Provides the authorization-code flow used to identify dashboard users.

mod provider;
mod state;
mod tokens;

pub mod providers;

pub use provider::{AuthorizationRequest, Provider, ProviderKind, UserInfo};
pub use state::{generate_state, state_matches};
pub use tokens::Tokens;
