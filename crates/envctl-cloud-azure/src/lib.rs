//! Azure provider for envctl
//!
//! Implements [`envctl_cloud::CloudProvider`] by shelling out to the Azure
//! CLIs and ships the Azure resource-type catalog used to order teardown.
//!
//! # Requirements
//!
//! - `az` must be installed and logged in (`az login`)
//! - `azd` must be installed for `envctl startup`
//!
//! # Example
//!
//! ```ignore
//! use envctl_cloud::CloudProvider;
//! use envctl_cloud_azure::AzureProvider;
//!
//! let provider = AzureProvider::new(None, "eastus");
//!
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let resources = provider.list_resources("rg-webplatform-it").await?;
//! ```

pub mod az;
pub mod azd;
pub mod catalog;
pub mod error;
pub mod provider;

pub use az::{AccountInfo, AzCli, ResourceInfo};
pub use azd::Azd;
pub use catalog::{PurgeKind, deletion_graph};
pub use error::{AzureError, Result};
pub use provider::AzureProvider;
