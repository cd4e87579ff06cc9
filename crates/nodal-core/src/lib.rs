//! Element-level kernel of the nodal circuit simulator.
//!
//! This crate provides the per-element state a device model stamps into:
//! ports, the MNA / S-parameter / noise / harmonic-balance matrix families,
//! the transient companion stamps for charge storage, and the time-domain
//! histories used for delayed quantities.
//!
//! Assembling element contributions into the global system, and solving
//! it, is left to the analysis driver.

mod companion;
pub mod device;
pub mod element;
pub mod error;
pub mod history;
pub mod integrator;
pub mod mna;
pub mod node;
pub mod states;
pub mod values;

pub use device::Device;
pub use element::{Element, Polarity};
pub use error::{Error, Result};
pub use history::{History, HistoryParams, Nearest, Side, TimeGrid};
pub use integrator::{Companion, IntegrationMethod, Integrator, StepIntegrator};
pub use mna::{HbBuffers, MnaMatrices};
pub use node::{ElementId, Node};
pub use states::StateVars;
pub use values::ValueMap;
