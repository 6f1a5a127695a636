//! envctl cloud layer
//!
//! Provider abstraction plus everything the lifecycle needs on top of it
//! that is independent of Azure itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   envctl CLI                     │
//! │    (shutdown / startup / verify / emergency)     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 envctl-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          trait CloudProvider              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌────────────┐ ┌────────────┐ ┌────────────┐   │
//! │  │  graph +   │ │  verifier  │ │   fan-out  │   │
//! │  │  teardown  │ │  (polling) │ │  (JoinSet) │   │
//! │  └────────────┘ └────────────┘ └────────────┘   │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │ azure (az/azd)│ │ mock (tests)  │
//! └───────────────┘ └───────────────┘
//! ```

pub mod action;
pub mod error;
pub mod fanout;
pub mod graph;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;
pub mod teardown;
pub mod verify;

// Re-exports
pub use action::{ActionResult, ActionType, ApplyResult};
pub use error::{CloudError, Result};
pub use fanout::{JobResult, run_all};
pub use graph::{DeletionGraph, ResourceKind, Tier};
pub use provider::{AuthStatus, CloudProvider, CloudResource, ProvisionTarget};
pub use teardown::{TeardownEvent, TeardownPlan, TeardownReport, TeardownStep, execute};
pub use verify::{Expectation, Observation, Verifier, VerifyOutcome};
