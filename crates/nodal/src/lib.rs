//! # Nodal
//!
//! The element-level kernel of a circuit simulator.
//!
//! Nodal provides the pieces an analysis driver builds on:
//! - Per-element MNA, S-parameter, noise and harmonic-balance matrices
//! - Voltage-source, conductance and current stamps
//! - Transient companion models for charge storage
//! - Time-domain histories for delayed quantities
//! - Spline-based sample interpolation
//! - Linear device models (R, L, C, sources, delayed VCVS, ideal line)
//!
//! ## Quick Start
//!
//! ```rust
//! use nodal::prelude::*;
//!
//! let mut r = Resistor::new("R1", 1000.0).unwrap();
//! r.init_dc();
//! assert_eq!(r.element().get_y(0, 0), Complex::new(1e-3, 0.0));
//! ```
//!
//! ## Delayed Quantities
//!
//! ```rust
//! use nodal::prelude::*;
//!
//! let mut clock = History::time_logger();
//! let mut values = History::new(HistoryParams::with_age(1.0));
//! values.apply(&clock);
//! for k in 0..5 {
//!     clock.push_back(k as f64 * 0.25);
//!     values.push_back(k as f64);
//! }
//! let hit = values.nearest(0.5, false);
//! assert_eq!(hit, 2.0);
//! ```

// Re-export member crates
pub use nodal_core as core;
pub use nodal_devices as devices;
pub use nodal_interp as interp;

// ============================================================================
// Convenient re-exports from nodal_core
// ============================================================================

pub use nodal_core::{
    Companion,
    // Element kernel
    Device,
    Element,
    ElementId,
    // Errors
    Error as CoreError,
    // Histories
    History,
    HistoryParams,
    // Integration
    IntegrationMethod,
    Integrator,
    MnaMatrices,
    Nearest,
    Node,
    Polarity,
    Side,
    StateVars,
    StepIntegrator,
    TimeGrid,
    ValueMap,
};

// ============================================================================
// Convenient re-exports from nodal_devices
// ============================================================================

pub use nodal_devices::{
    Capacitor,
    CurrentSource,
    // Delayed elements
    DelayedVcvs,
    // Errors
    Error as DeviceError,
    IdealTline,
    Inductor,
    // Passive elements
    Resistor,
    SampledVoltageSource,
    // Sources
    VoltageSource,
};

// ============================================================================
// Convenient re-exports from nodal_interp
// ============================================================================

pub use nodal_interp::{
    Boundary, Domain, Error as InterpError, InterpolationMode, Interpolator, Repeat, Spline,
};

// ============================================================================
// Re-export commonly used external types
// ============================================================================

/// Re-export of nalgebra's dynamic vector type.
pub use nalgebra::DVector;

/// Re-export of nalgebra's dynamic matrix type.
pub use nalgebra::DMatrix;

/// Re-export of num_complex's Complex type.
pub use num_complex::Complex;

/// Re-export of the double-precision complex type every element matrix holds.
pub use num_complex::Complex64;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module containing commonly used types and traits.
///
/// ```rust
/// use nodal::prelude::*;
/// ```
pub mod prelude {
    // Element kernel
    pub use crate::{Device, Element, Node, Polarity};

    // Transient
    pub use crate::{Companion, IntegrationMethod, Integrator, StepIntegrator};

    // Histories
    pub use crate::{History, HistoryParams};

    // Interpolation
    pub use crate::{InterpolationMode, Interpolator, Repeat, Spline};

    // Devices
    pub use crate::{
        Capacitor, CurrentSource, DelayedVcvs, IdealTline, Inductor, Resistor,
        SampledVoltageSource, VoltageSource,
    };

    // Common external types
    pub use crate::{Complex, Complex64, DMatrix, DVector};
}
