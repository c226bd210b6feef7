//! # Attendance Subsystem (SG-04)
//!
//! Records when an admitted identity arrived, relative to the start of the
//! active session.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): session-start parsing, elapsed-time
//!   arithmetic, error taxonomy
//! - **Ports Layer** (`ports/`): `AttendanceApi` in; `SessionStore` and
//!   `TimeSource` out
//! - **Service Layer** (`service.rs`): the recording algorithm
//!
//! ## Recording Steps
//!
//! 1. Read the active-session pointer (`NoActiveSession` when absent)
//! 2. Fetch that session (`SessionNotFound`)
//! 3. Require its `started` timestamp (`MissingStartTime`)
//! 4. Parse it as RFC 3339, `Z` suffix included (`MalformedTimestamp`)
//! 5. `elapsed = now - started`, floored to whole milliseconds
//! 6. Overwrite `sessions/{key}/attendance/{credentialKey}`
//!
//! ## Known Behaviour
//!
//! - A second grant for the same credential in the same session overwrites
//!   the first entry, losing the original time-in.
//! - A session start in the future yields a negative `timeIn`, written as is.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::elapsed::{elapsed_millis, parse_session_start};
pub use domain::entities::AttendanceReceipt;
pub use domain::errors::AttendanceError;
pub use ports::inbound::AttendanceApi;
pub use ports::outbound::{FixedTimeSource, SessionStore, SystemTimeSource, TimeSource};
pub use service::AttendanceRecorder;
