//! Upstream clients for vitrine.
//!
//! This crate provides the HTTP session with User-Agent rotation and the
//! MercadoLibre page source that plugs into the core paginated crawler.

pub mod mercadolibre;
pub mod session;

pub use mercadolibre::{MercadoLibreSource, SERVICE_NAME, crawler};
pub use session::{Session, SessionError, UserAgentPool};
