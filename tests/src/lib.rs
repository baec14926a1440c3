//! # Wallet Adapter Test Suite
//!
//! Full adapter flows against [`wallet_adapter::MockAgent`].
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs       # Scripted agents and sample values
//!     ├── session_flows.rs  # Connect, reconnect, invalidation
//!     └── batch_flows.rs    # Ordering, all-or-nothing, authorization
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wallet-tests
//! cargo test -p wallet-tests integration::session_flows::
//! ```

#![allow(dead_code)]

pub mod integration;
