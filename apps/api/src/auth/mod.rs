// Session resolution for tokens issued by the external auth service.
// Sign-up, sign-in and OAuth flows live there; this crate only reads sessions.

pub mod extract;
pub mod handlers;
pub mod session;
