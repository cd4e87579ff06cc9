//! Interpolation engine for the nodal circuit kernel.
//!
//! This crate provides:
//! - [`Spline`]: piecewise-cubic interpolant with natural, clamped or
//!   periodic boundary conditions
//! - [`Interpolator`]: value lookup over real or complex samples with linear,
//!   cubic or zero-order-hold evaluation, periodic repetition and polar
//!   (magnitude/phase) data handling
//!
//! Both are plain value types. They copy the samples they are given and never
//! refer back to the caller's buffers.

pub mod error;
pub mod interpolator;
pub mod spline;

pub use error::{Error, Result};
pub use interpolator::{Domain, InterpolationMode, Interpolator, Repeat};
pub use spline::{Boundary, MIN_POINTS, Poly, Spline};
