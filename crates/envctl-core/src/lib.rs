//! envctl core
//!
//! Environment descriptors, cost estimates, the confirmation gate and the
//! `envctl.kdl` parser shared by every envctl crate.
//!
//! ```text
//! envctl.kdl ──▶ parser ──▶ Manifest { environments, verify, teardown rules }
//!                                 │
//!                                 ▼
//!                 CostGate ◀── Environment (cost, confirmation policy)
//! ```

pub mod defaults;
pub mod error;
pub mod gate;
pub mod loader;
pub mod model;
pub mod parser;
pub mod template;

pub use error::{CoreError, Result};
pub use gate::{Confirm, CostGate, GateDecision, GatePrompt, Preconfirmed};
pub use loader::{load_manifest, load_manifest_or_default};
pub use model::*;
pub use parser::parse_kdl_string;
pub use template::starter_config;
