//! Admin authorization: the email allowlist and the gate built on top of it.

pub mod allowlist;
pub mod gate;

pub use allowlist::{Allowlist, AllowlistError, admin_email_allowlist, is_allowed_admin_email};
pub use gate::{AccessDecision, AdminGate, Gated, GatePolicy, Surface};
