//! Gas-monitoring telemetry analytics.
//!
//! `domain` is the pure core: severity classification, manual override
//! arbitration, daily bucketing and series reduction, distribution summaries and
//! the report table. It performs no I/O and takes the reference instant as a
//! parameter. The other layers fetch readings, wire services and serve HTTP.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
