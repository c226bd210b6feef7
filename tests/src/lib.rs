//! # SmartGuard Test Suite
//!
//! Cross-crate tests for the gateway, driven through the in-memory broker
//! with the verification handler running.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── pipeline_benchmarks.rs  # validation, template scan, full route
//! └── src/integration/
//!     ├── harness.rs              # running gateway over broker + store + clock
//!     ├── scenarios.rs            # reader scenarios end to end
//!     └── properties.rs           # pipeline-wide properties (proptest)
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sg-tests
//! cargo test -p sg-tests integration::scenarios::
//! cargo bench -p sg-tests
//! ```

pub mod integration;
