//! Independent source models: Voltage and Current sources.

use nodal_core::{Device, Element, Integrator};
use num_complex::Complex64;

use crate::stamp::{NEG, POS, open_sparams, series_sparams};

/// An independent voltage source.
///
/// `V(pos) - V(neg) = value` through branch row 0; the branch current flows
/// from `pos` through the source to `neg`.
#[derive(Debug, Clone)]
pub struct VoltageSource {
    element: Element,
    /// DC value in volts.
    pub dc: f64,
    /// AC stimulus (magnitude and phase as a phasor).
    pub ac: Complex64,
}

impl VoltageSource {
    /// Create a DC voltage source with no AC stimulus.
    pub fn new(name: impl Into<String>, dc: f64) -> Self {
        Self {
            element: Element::with_size(name, 2, 1),
            dc,
            ac: Complex64::new(0.0, 0.0),
        }
    }

    /// Set the AC stimulus.
    pub fn with_ac(mut self, ac: impl Into<Complex64>) -> Self {
        self.ac = ac.into();
        self
    }

    fn stamp(&mut self, value: Complex64) {
        self.element.alloc_matrix_mna();
        self.element.voltage_source(0, POS, NEG, value);
    }

    /// Current delivered by the source from the present solution.
    pub fn current(&self) -> f64 {
        -self.element.get_j(0).re
    }
}

impl Device for VoltageSource {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn calc_sp(&mut self, _frequency: f64) {
        series_sparams(&mut self.element, Complex64::new(0.0, 0.0));
    }

    fn init_dc(&mut self) {
        self.stamp(Complex64::new(self.dc, 0.0));
    }

    fn init_ac(&mut self) {
        self.stamp(self.ac);
    }

    fn init_tr(&mut self) {
        self.stamp(Complex64::new(self.dc, 0.0));
    }

    fn calc_tr(&mut self, _t: f64, _integrator: &dyn Integrator) {
        self.element.set_e(0, self.dc);
    }

    fn calc_operating_points(&mut self) {
        let i = self.current();
        self.element.set_operating_point("I", i);
    }
}

/// An independent current source.
///
/// The current flows from `pos` through the source to `neg`.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    element: Element,
    /// DC value in amperes.
    pub dc: f64,
    /// AC stimulus.
    pub ac: Complex64,
}

impl CurrentSource {
    /// Create a DC current source with no AC stimulus.
    pub fn new(name: impl Into<String>, dc: f64) -> Self {
        Self {
            element: Element::with_size(name, 2, 0),
            dc,
            ac: Complex64::new(0.0, 0.0),
        }
    }

    /// Set the AC stimulus.
    pub fn with_ac(mut self, ac: impl Into<Complex64>) -> Self {
        self.ac = ac.into();
        self
    }

    fn stamp(&mut self, value: Complex64) {
        self.element.alloc_matrix_mna();
        self.element.current(POS, NEG, value);
    }
}

impl Device for CurrentSource {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn calc_sp(&mut self, _frequency: f64) {
        open_sparams(&mut self.element);
    }

    fn init_dc(&mut self) {
        self.stamp(Complex64::new(self.dc, 0.0));
    }

    fn init_ac(&mut self) {
        self.stamp(self.ac);
    }

    fn init_tr(&mut self) {
        self.stamp(Complex64::new(self.dc, 0.0));
    }
}
