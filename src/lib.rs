//! `BinaryLane` client - REST access to `BinaryLane` cloud resources.
//!
//! A library for driving the `BinaryLane` API with:
//! - **Pagination**: Collect every page of a list endpoint by following `next` links
//! - **Action waiting**: Poll an asynchronous action until it completes, fails, or is cancelled
//! - **Servers**: Create, list, delete servers and run power/rebuild/resize actions
//! - **Load balancers**: Manage load balancers, their backends and forwarding rules
//! - **Catalog**: Regions, sizes and account information
//!
//! ## Quick Start
//!
//! All configuration is loaded from environment variables. Create a `.env` file:
//!
//! ```text
//! BINARYLANE_API_TOKEN=your_api_token_here
//! BINARYLANE_ACTION_POLL_INTERVAL_MS=5000
//! ```
//!
//! Then reboot a server and wait for it to come back:
//!
//! ```ignore
//! use binarylane_client::{BinaryLaneClient, BinaryLaneClientConfig, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = BinaryLaneClientConfig::from_env()?;
//!     let timeout = cfg.action_timeout();
//!     let client = BinaryLaneClient::new(cfg)?;
//!
//!     for server in client.servers().list(ListOptions::all()).await? {
//!         println!("{} {} {}", server.id, server.name, server.status);
//!     }
//!
//!     let action = client.server_actions().reboot(12345).await?;
//!     client
//!         .wait_for_action_with_timeout(&action.reference(), timeout)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy for strict discipline
#![deny(clippy::all)]                 // All standard Clippy lints
#![deny(clippy::pedantic)]            // Very strict Clippy lints
#![deny(clippy::nursery)]             // Experimental lints
#![deny(clippy::unwrap_used)]         // unwrap() is forbidden
#![deny(clippy::expect_used)]         // expect() is forbidden
#![deny(clippy::panic)]               // panic!() is forbidden
#![deny(clippy::print_stdout)]        // println!() is forbidden in production
#![deny(clippy::todo)]                // TODO is forbidden
#![deny(clippy::unimplemented)]       // unimplemented!() is forbidden
#![deny(clippy::missing_const_for_fn)] // Force const when possible
#![deny(clippy::unwrap_in_result)]    // unwrap() in Result is forbidden
#![deny(clippy::module_inception)]    // Module with same name as crate is forbidden
#![deny(clippy::redundant_clone)]     // Useless clones are forbidden
#![deny(clippy::shadow_unrelated)]    // Shadowing unrelated variables is forbidden
#![deny(clippy::too_many_arguments)]  // Limit function arguments
#![deny(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Modules
// ============================================================================

/// Crate-wide error type.
pub mod binarylane_error;

/// HTTP transport, configuration and rate-limit counters.
///
/// Use this module to build a client and reach every resource service.
pub mod binarylane_client;

/// Page cursors and the page-following collector.
///
/// Use this module to fetch one page or every page of a list endpoint.
pub mod binarylane_pagination;

/// Action records, references and the action endpoints.
pub mod binarylane_actions;

/// Polling an action until it reaches a terminal status.
///
/// Use this module to block on long-running operations with a timeout or a
/// cancellation signal.
pub mod binarylane_waiter;

/// Server endpoints.
pub mod binarylane_servers;

/// Server actions (power, reboot, resize, rebuild, ...).
pub mod binarylane_server_actions;

/// Load balancer endpoints.
pub mod binarylane_load_balancers;

/// Regions and sizes.
pub mod binarylane_catalog;

/// Account information.
pub mod binarylane_account;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use binarylane_account::Account;
pub use binarylane_actions::{Action, ActionLink, ActionReference, ActionStatus};
pub use binarylane_catalog::{Region, Size};
pub use binarylane_client::{BinaryLaneClient, BinaryLaneClientConfig, Rate};
pub use binarylane_error::BinaryLaneError;
pub use binarylane_load_balancers::{
    ForwardingRule, HealthCheck, LoadBalancer, LoadBalancerRequest, StickySessions,
};
pub use binarylane_pagination::{Links, ListOptions, Meta, Page, Pages, fetch_all};
pub use binarylane_server_actions::{ActionRequest, action_request};
pub use binarylane_servers::{
    CreatedServer, Server, ServerCreateImage, ServerCreateRequest, ServerMultiCreateRequest,
};
pub use binarylane_waiter::ActionWaiter;
