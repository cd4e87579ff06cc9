//! Device models built on the nodal element API.
//!
//! This crate provides device models for:
//! - Passive elements: R, C, L
//! - Independent sources: V, I
//! - Delayed controlled source and ideal transmission line, both reading
//!   past port values from the element histories
//! - A voltage source driven by sampled waveform data
//!
//! Every model owns an [`Element`](nodal_core::Element) and implements
//! [`Device`](nodal_core::Device). Port 0 is the positive terminal of the
//! two-terminal models, port 1 the negative one.

pub mod delay;
pub mod error;
pub mod passive;
pub mod sampled;
pub mod sources;
pub mod stamp;
pub mod tline;

pub use delay::DelayedVcvs;
pub use error::{Error, Result};
pub use passive::{Capacitor, Inductor, Resistor};
pub use sampled::SampledVoltageSource;
pub use sources::{CurrentSource, VoltageSource};
pub use tline::IdealTline;
