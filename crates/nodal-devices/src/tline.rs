//! Ideal (lossless) transmission line.
//!
//! Both ports are referenced to ground. In transient analysis each port is a
//! Thevenin source behind the characteristic impedance whose voltage is the
//! wave launched from the other port one delay earlier:
//!
//! ```text
//! V1(t) - Z I1(t) = V2(t - T) + Z I2(t - T)
//! V2(t) - Z I2(t) = V1(t - T) + Z I1(t - T)
//! ```
//!
//! with `I1`, `I2` the branch currents flowing into the line. The past values
//! come from the element histories, so the analysis driver must log them
//! every accepted step.

use std::f64::consts::PI;

use nodal_core::{Device, Element, Integrator};
use num_complex::Complex64;

use crate::error::{Result, positive};
use crate::stamp::Z0;

const PORT1: usize = 0;
const PORT2: usize = 1;
const BRANCH1: usize = 0;
const BRANCH2: usize = 1;

/// A lossless transmission line.
#[derive(Debug, Clone)]
pub struct IdealTline {
    element: Element,
    /// Characteristic impedance in ohms.
    pub z: f64,
    /// Propagation delay in seconds.
    pub delay: f64,
}

impl IdealTline {
    /// Create a new transmission line.
    pub fn new(name: impl Into<String>, z: f64, delay: f64) -> Result<Self> {
        Ok(Self {
            element: Element::with_size(name, 2, 2),
            z: positive("Z", z)?,
            delay: positive("TD", delay)?,
        })
    }

    /// Electrical length in radians at `frequency`.
    pub fn electrical_length(&self, frequency: f64) -> f64 {
        2.0 * PI * frequency * self.delay
    }

    /// Leave both branch rows as `J = 0`.
    fn idle_branches(&mut self) {
        self.element.set_d(BRANCH1, BRANCH1, 1.0);
        self.element.set_d(BRANCH2, BRANCH2, 1.0);
    }
}

impl Device for IdealTline {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn calc_sp(&mut self, frequency: f64) {
        let z = self.z / Z0;
        let theta = self.electrical_length(frequency);
        let cosh = Complex64::new(theta.cos(), 0.0);
        let sinh = Complex64::new(0.0, theta.sin());
        let d = 2.0 * z * cosh + (z * z + 1.0) * sinh;
        let s11 = (z * z - 1.0) * sinh / d;
        let s21 = 2.0 * z / d;

        let e = &mut self.element;
        e.set_s(PORT1, PORT1, s11);
        e.set_s(PORT2, PORT2, s11);
        e.set_s(PORT1, PORT2, s21);
        e.set_s(PORT2, PORT1, s21);
    }

    /// A short between the ports.
    fn init_dc(&mut self) {
        let e = &mut self.element;
        e.alloc_matrix_mna();
        e.voltage_source(BRANCH1, PORT1, PORT2, 0.0);
        e.set_d(BRANCH2, BRANCH2, 1.0);
    }

    fn init_ac(&mut self) {
        self.element.alloc_matrix_mna();
        self.idle_branches();
    }

    fn calc_ac(&mut self, frequency: f64) {
        let theta = self.electrical_length(frequency);
        let y11 = Complex64::new(0.0, -1.0 / (theta.tan() * self.z));
        let y21 = Complex64::new(0.0, 1.0 / (theta.sin() * self.z));

        let e = &mut self.element;
        e.set_y(PORT1, PORT1, y11);
        e.set_y(PORT2, PORT2, y11);
        e.set_y(PORT1, PORT2, y21);
        e.set_y(PORT2, PORT1, y21);
    }

    fn init_tr(&mut self) {
        let z = self.z;
        let e = &mut self.element;
        e.alloc_matrix_mna();
        e.set_b(PORT1, BRANCH1, 1.0);
        e.set_b(PORT2, BRANCH2, 1.0);
        e.set_c(BRANCH1, PORT1, 1.0);
        e.set_c(BRANCH2, PORT2, 1.0);
        e.set_d(BRANCH1, BRANCH1, -z);
        e.set_d(BRANCH2, BRANCH2, -z);
        e.init_history(self.delay);
    }

    fn calc_tr(&mut self, t: f64, _integrator: &dyn Integrator) {
        let td = t - self.delay;
        let z = self.z;
        let e = &mut self.element;
        let e1 = e.get_j_past(BRANCH2, td) * z + e.get_v_past(PORT2, td);
        let e2 = e.get_j_past(BRANCH1, td) * z + e.get_v_past(PORT1, td);
        e.set_e(BRANCH1, e1);
        e.set_e(BRANCH2, e2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(IdealTline::new("T1", 0.0, 1e-9).is_err());
        assert!(IdealTline::new("T1", 50.0, -1e-9).is_err());
    }

    #[test]
    fn test_matched_line_sparams() {
        let mut t = IdealTline::new("T1", Z0, 1e-9).unwrap();
        t.calc_sp(250e6);
        let e = t.element();
        // Matched: no reflection, quarter-wave phase delay.
        assert!(e.get_s(0, 0).norm() < 1e-12);
        let s21 = e.get_s(1, 0);
        assert!((s21.norm() - 1.0).abs() < 1e-12);
        assert!((s21.arg() + PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_wave_admittance() {
        let mut t = IdealTline::new("T1", 50.0, 1e-9).unwrap();
        t.init_ac();
        t.calc_ac(250e6);
        let e = t.element();
        // tan(pi/2) is huge: y11 vanishes, |y21| = 1/Z.
        assert!(e.get_y(0, 0).norm() < 1e-12);
        assert!((e.get_y(1, 0).im - 0.02).abs() < 1e-12);
        assert_eq!(e.get_d(1, 1).re, 1.0);
    }

    #[test]
    fn test_transient_rows() {
        let mut t = IdealTline::new("T1", 75.0, 1e-9).unwrap();
        t.init_tr();
        let e = t.element();
        assert_eq!(e.get_d(0, 0).re, -75.0);
        assert_eq!(e.get_b(1, 1).re, 1.0);
        assert_eq!(e.get_c(0, 0).re, 1.0);
        assert!(e.has_history());
    }
}
