//! Identity of the caller as reported by the external authentication layer.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod provider;
mod request_context;

pub use principal::Identity;
pub use provider::{IdentityProvider, ForwardedHeaderProvider, DEFAULT_EMAIL_HEADER, DEFAULT_USER_HEADER};
pub use request_context::RequestContext;
