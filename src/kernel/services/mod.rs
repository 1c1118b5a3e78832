//! Services layer (ports + adapters).
//!
//! - `ports`: contracts and data types the workspace core talks to.
//! - `adapters`: OS/runtime specific implementations (IO/async).

pub mod adapters;
pub mod ports;
