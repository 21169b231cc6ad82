//! certdesk core library.
//!
//! Client-side state and plumbing for a certificate-management backend:
//! configuration, the typed REST gateway, the session store (the single
//! authority over authentication state), and the navigation guard that gates
//! access to application routes.

pub mod config;
pub mod gateway;
pub mod nav;
pub mod session;
