//! Passive element models: R, C, L.

use std::f64::consts::PI;

use nodal_core::{Device, Element, Integrator};
use num_complex::Complex64;

use crate::error::{Result, positive};
use crate::stamp::{
    DEFAULT_TEMP, NEG, POS, Z0, branch_voltage, open_sparams, series_sparams, thermal_noise,
};

/// A linear resistor.
#[derive(Debug, Clone)]
pub struct Resistor {
    element: Element,
    /// Resistance in ohms.
    pub resistance: f64,
    /// Temperature in kelvin, for thermal noise.
    pub temperature: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(name: impl Into<String>, resistance: f64) -> Result<Self> {
        Ok(Self {
            element: Element::with_size(name, 2, 0),
            resistance: positive("R", resistance)?,
            temperature: DEFAULT_TEMP,
        })
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    fn stamp(&mut self) {
        let g = self.conductance();
        self.element.alloc_matrix_mna();
        self.element.conductance(POS, NEG, g);
    }
}

impl Device for Resistor {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn calc_sp(&mut self, _frequency: f64) {
        let z = Complex64::new(self.resistance / Z0, 0.0);
        series_sparams(&mut self.element, z);
    }

    fn init_dc(&mut self) {
        self.stamp();
    }

    fn init_ac(&mut self) {
        self.stamp();
    }

    fn init_tr(&mut self) {
        self.stamp();
    }

    fn init_noise_ac(&mut self) {
        self.element.alloc_matrix_n(0);
    }

    fn calc_noise_ac(&mut self, _frequency: f64) {
        let g = self.conductance();
        thermal_noise(&mut self.element, g, self.temperature);
    }

    fn calc_operating_points(&mut self) {
        let v = branch_voltage(&self.element);
        let i = v / self.resistance;
        let e = &mut self.element;
        e.set_operating_point("Vr", v);
        e.set_operating_point("I", i);
        e.set_operating_point("P", v * i);
    }
}

/// A linear capacitor.
///
/// Open at DC; `jwC` in AC; charge companion model in transient. The charge
/// lives in state slot 0 and its current in slot 1.
#[derive(Debug, Clone)]
pub struct Capacitor {
    element: Element,
    /// Capacitance in farads.
    pub capacitance: f64,
}

impl Capacitor {
    const QSTATE: usize = 0;

    /// Create a new capacitor.
    pub fn new(name: impl Into<String>, capacitance: f64) -> Result<Self> {
        Ok(Self {
            element: Element::with_size(name, 2, 0),
            capacitance: positive("C", capacitance)?,
        })
    }

    /// Admittance at `frequency`.
    pub fn admittance(&self, frequency: f64) -> Complex64 {
        Complex64::new(0.0, 2.0 * PI * frequency * self.capacitance)
    }
}

impl Device for Capacitor {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn calc_sp(&mut self, frequency: f64) {
        let y = self.admittance(frequency);
        if y.norm() == 0.0 {
            open_sparams(&mut self.element);
        } else {
            series_sparams(&mut self.element, y.inv() / Z0);
        }
    }

    fn init_dc(&mut self) {
        self.element.alloc_matrix_mna();
    }

    fn init_ac(&mut self) {
        self.element.alloc_matrix_mna();
    }

    fn calc_ac(&mut self, frequency: f64) {
        let y = self.admittance(frequency);
        self.element.clear_stamps();
        self.element.conductance(POS, NEG, y);
    }

    fn init_tr(&mut self) {
        let q = self.capacitance * branch_voltage(&self.element);
        let e = &mut self.element;
        e.init_states(2);
        e.fill_state(Self::QSTATE, q);
        e.fill_state(Self::QSTATE + 1, 0.0);
    }

    fn calc_tr(&mut self, _t: f64, integrator: &dyn Integrator) {
        let v = branch_voltage(&self.element);
        let c = self.capacitance;
        let e = &mut self.element;
        e.clear_stamps();
        e.transient_capacitance(integrator, Self::QSTATE, POS, NEG, c, v, c * v);
    }

    fn calc_operating_points(&mut self) {
        let v = branch_voltage(&self.element);
        let q = self.capacitance * v;
        self.element.set_operating_point("V", v);
        self.element.set_operating_point("Q", q);
    }
}

/// A linear inductor.
///
/// Carries one branch row: a short at DC, `V = jwL I` in AC and a flux
/// companion model in transient (flux in state slot 0, voltage in slot 1).
#[derive(Debug, Clone)]
pub struct Inductor {
    element: Element,
    /// Inductance in henries.
    pub inductance: f64,
}

impl Inductor {
    const FSTATE: usize = 0;

    /// Create a new inductor.
    pub fn new(name: impl Into<String>, inductance: f64) -> Result<Self> {
        Ok(Self {
            element: Element::with_size(name, 2, 1),
            inductance: positive("L", inductance)?,
        })
    }

    /// Branch current from the present solution.
    pub fn current(&self) -> f64 {
        self.element.get_j(0).re
    }

    fn short(&mut self) {
        self.element.alloc_matrix_mna();
        self.element.voltage_source(0, POS, NEG, 0.0);
    }
}

impl Device for Inductor {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn calc_sp(&mut self, frequency: f64) {
        let z = Complex64::new(0.0, 2.0 * PI * frequency * self.inductance) / Z0;
        series_sparams(&mut self.element, z);
    }

    fn init_dc(&mut self) {
        self.short();
    }

    fn init_ac(&mut self) {
        self.short();
    }

    fn calc_ac(&mut self, frequency: f64) {
        let z = Complex64::new(0.0, 2.0 * PI * frequency * self.inductance);
        self.element.set_d(0, 0, -z);
    }

    fn init_tr(&mut self) {
        let flux = self.inductance * self.current();
        self.short();
        let e = &mut self.element;
        e.init_states(2);
        e.fill_state(Self::FSTATE, flux);
        e.fill_state(Self::FSTATE + 1, 0.0);
    }

    fn calc_tr(&mut self, _t: f64, integrator: &dyn Integrator) {
        let flux = self.inductance * self.current();
        let e = &mut self.element;
        e.set_state(Self::FSTATE, flux, 0);
        let comp = e.integrate(integrator, Self::FSTATE, self.inductance);
        e.set_d(0, 0, -comp.geq);
        e.set_e(0, comp.ceq);
    }

    fn calc_operating_points(&mut self) {
        let i = self.current();
        self.element.set_operating_point("I", i);
    }
}
