//! Voltage source driven by sampled waveform data.
//!
//! The samples are supplied by the caller (e.g. read from a waveform file
//! elsewhere) and evaluated through an [`Interpolator`].

use log::debug;
use nodal_core::{Device, Element, Integrator};
use nodal_interp::{Domain, InterpolationMode, Interpolator, Repeat};

use crate::error::Result;
use crate::stamp::{NEG, POS};

/// A voltage source following `(time, value)` samples.
#[derive(Debug, Clone)]
pub struct SampledVoltageSource {
    element: Element,
    interpolator: Interpolator,
    /// Scale applied to every sample.
    pub gain: f64,
    /// Time shift: the source reads its samples at `t - delay`.
    pub delay: f64,
}

impl SampledVoltageSource {
    /// Create a source from samples `values` at `times`.
    ///
    /// `times` must be ascending.
    pub fn new(
        name: impl Into<String>,
        times: &[f64],
        values: &[f64],
        mode: InterpolationMode,
        repeat: Repeat,
    ) -> Result<Self> {
        let mut interpolator = Interpolator::new();
        interpolator.rvectors(values, times)?;
        interpolator.prepare(mode, repeat, Domain::Rectangular)?;

        let element = Element::with_size(name, 2, 1);
        debug!(
            "{}: {} samples, {:?}, {:?}",
            element.name(),
            times.len(),
            interpolator.mode(),
            repeat
        );
        Ok(Self {
            element,
            interpolator,
            gain: 1.0,
            delay: 0.0,
        })
    }

    /// Source value at time `t`.
    pub fn value(&self, t: f64) -> f64 {
        self.gain * self.interpolator.rinterpolate(t - self.delay)
    }

    fn stamp(&mut self, value: f64) {
        self.element.alloc_matrix_mna();
        self.element.voltage_source(0, POS, NEG, value);
    }
}

impl Device for SampledVoltageSource {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn init_dc(&mut self) {
        self.stamp(self.value(0.0));
    }

    /// No AC stimulus: the source is a short.
    fn init_ac(&mut self) {
        self.stamp(0.0);
    }

    fn init_tr(&mut self) {
        self.stamp(self.value(0.0));
    }

    fn calc_tr(&mut self, t: f64, _integrator: &dyn Integrator) {
        let v = self.value(t);
        self.element.set_e(0, v);
    }
}
