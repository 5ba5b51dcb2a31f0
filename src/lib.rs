//! Lead commercial-signal pipeline.
//!
//! Turns a lead's SYSTEM activity log into a signal level, display
//! temperature and human-SLA status, and keeps ingested sector intelligence
//! clean. Derivation lives in [`signals`]; storage in [`db`]; label repair
//! and the sector dedup pass in [`hygiene`].

pub mod audit;
pub mod db;
pub mod error;
pub mod hygiene;
mod migrations;
pub mod signals;
pub mod state;
pub mod types;
pub mod util;

pub use audit::SystemActor;
pub use db::{DbError, LeadDb};
pub use error::LeadError;
pub use types::Config;
