//! # Subsystem Wiring
//!
//! Connects the four subsystems into the verification pipeline.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        TRANSPORT                               │
//! │            verify/card           verify/fingerprint            │
//! └───────────────────────────────┬────────────────────────────────┘
//!                                 ▼
//!  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────────┐
//!  │  SG-01   │──►│  SG-02   │──►│  SG-03   │──►│    SG-04     │
//!  │ Validate │   │ Resolve  │   │  Policy  │   │  Attendance  │
//!  └──────────┘   └──────────┘   └────┬─────┘   └──────────────┘
//!                                     │ Allow
//!                                     ▼
//!                                 lock/open "OK"
//! ```
//!
//! The router is the only place the subsystems meet; none of them depends
//! on another.

pub mod event_routing;

pub use event_routing::{AccessGranted, EventRouter, PipelineError, Route, TopicRoutes};
