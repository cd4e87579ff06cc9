//! Voltage-controlled voltage source with a transport delay.
//!
//! ```text
//! V(out+) - V(out-) = G * (V(in+) - V(in-))(t - T)
//! ```
//!
//! With `T = 0` the controlling voltage enters the branch row directly. With
//! `T > 0` the transient branch equation reads the control voltage from the
//! port histories, so the analysis driver must log them every accepted step.

use std::f64::consts::PI;

use nodal_core::{Device, Element, Integrator};
use num_complex::Complex64;

use crate::error::{Error, Result};

const IN_POS: usize = 0;
const IN_NEG: usize = 1;
const OUT_POS: usize = 2;
const OUT_NEG: usize = 3;

/// A delayed voltage-controlled voltage source.
#[derive(Debug, Clone)]
pub struct DelayedVcvs {
    element: Element,
    /// Voltage gain.
    pub gain: f64,
    /// Transport delay in seconds.
    pub delay: f64,
}

impl DelayedVcvs {
    /// Create a new delayed VCVS.
    pub fn new(name: impl Into<String>, gain: f64, delay: f64) -> Result<Self> {
        let name = name.into();
        if !(delay >= 0.0 && delay.is_finite()) {
            return Err(Error::InvalidValue { name, value: delay });
        }
        Ok(Self {
            element: Element::with_size(name, 4, 1),
            gain,
            delay,
        })
    }

    /// Output branch plus the controlling coefficients `-g` on the input.
    fn stamp(&mut self, g: Complex64) {
        let e = &mut self.element;
        e.alloc_matrix_mna();
        e.voltage_source(0, OUT_POS, OUT_NEG, 0.0);
        e.set_c(0, IN_POS, -g);
        e.set_c(0, IN_NEG, g);
    }

    /// Output branch only; the source value comes from history.
    fn stamp_delayed(&mut self) {
        let e = &mut self.element;
        e.alloc_matrix_mna();
        e.voltage_source(0, OUT_POS, OUT_NEG, 0.0);
    }
}

impl Device for DelayedVcvs {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn init_dc(&mut self) {
        self.stamp(Complex64::new(self.gain, 0.0));
    }

    fn init_ac(&mut self) {
        self.stamp(Complex64::new(self.gain, 0.0));
    }

    fn calc_ac(&mut self, frequency: f64) {
        let g = Complex64::from_polar(self.gain, -2.0 * PI * frequency * self.delay);
        self.element.set_c(0, IN_POS, -g);
        self.element.set_c(0, IN_NEG, g);
    }

    fn init_tr(&mut self) {
        if self.delay > 0.0 {
            self.stamp_delayed();
            self.element.init_history(self.delay);
        } else {
            self.stamp(Complex64::new(self.gain, 0.0));
        }
    }

    fn calc_tr(&mut self, t: f64, _integrator: &dyn Integrator) {
        if self.delay > 0.0 {
            let td = t - self.delay;
            let e = &mut self.element;
            let vin = e.get_v_past(IN_POS, td) - e.get_v_past(IN_NEG, td);
            e.set_e(0, self.gain * vin);
        }
    }
}
