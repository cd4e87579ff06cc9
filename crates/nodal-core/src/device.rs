//! Analysis-phase entry points implemented by device models.

use crate::element::Element;
use crate::integrator::Integrator;

/// A device model built on an [`Element`].
///
/// Each analysis has an `init_*` hook, run once per topology or sweep
/// change, and a `calc_*` hook, run once per evaluation point. A device
/// implements the phases it takes part in; the rest default to no-ops.
/// Scheduling the phases is the analysis driver's job.
pub trait Device: std::fmt::Debug {
    /// The element state this device stamps into.
    fn element(&self) -> &Element;

    fn element_mut(&mut self) -> &mut Element;

    fn init_sp(&mut self) {}

    fn calc_sp(&mut self, _frequency: f64) {}

    fn init_dc(&mut self) {}

    fn calc_dc(&mut self) {}

    /// Undo Newton-iteration state before a DC restart.
    fn restart_dc(&mut self) {}

    fn init_ac(&mut self) {}

    fn calc_ac(&mut self, _frequency: f64) {}

    fn init_tr(&mut self) {}

    /// Stamp the transient contribution at time `t`.
    fn calc_tr(&mut self, _t: f64, _integrator: &dyn Integrator) {}

    fn init_hb(&mut self) {}

    fn calc_hb(&mut self, _frequency: f64) {}

    fn init_noise_sp(&mut self) {}

    fn calc_noise_sp(&mut self, _frequency: f64) {}

    fn init_noise_ac(&mut self) {}

    fn calc_noise_ac(&mut self, _frequency: f64) {}

    /// Record operating-point diagnostics from the present solution.
    fn calc_operating_points(&mut self) {}

    /// Record small-signal characteristics from the present solution.
    fn calc_characteristics(&mut self) {}

    /// Device name.
    fn name(&self) -> &str {
        self.element().name()
    }
}
