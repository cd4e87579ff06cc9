//! Sample interpolation over real or complex data.
//!
//! An [`Interpolator`] holds a private copy of one sampled series and answers
//! value queries at arbitrary abscissas. Queries outside the sample range are
//! never errors: linear mode extends the boundary tangent, hold mode returns
//! the nearest left sample, cubic mode follows the spline's extrapolation
//! and periodic data is wrapped into one period first.

use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use log::debug;
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::spline::{Boundary, MIN_POINTS, Spline};

/// Evaluation scheme between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Two-point linear blend.
    #[default]
    Linear,
    /// Cubic spline through all samples.
    Cubic,
    /// Zero-order hold of the left sample.
    Hold,
}

/// Whether the samples describe one period of a repeating signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// The samples are used once.
    #[default]
    Once,
    /// The samples repeat with period `x[last] - x[0]`.
    Periodic,
}

/// How complex samples are interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    /// Real and imaginary parts separately.
    #[default]
    Rectangular,
    /// Magnitude and unwrapped phase separately.
    Polar,
}

#[derive(Debug, Clone)]
enum Ordinates {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl Default for Ordinates {
    fn default() -> Self {
        Ordinates::Real(Vec::new())
    }
}

/// Value lookup over one sampled series.
///
/// Load samples with [`rvectors`](Self::rvectors) or
/// [`cvectors`](Self::cvectors), then call [`prepare`](Self::prepare) before
/// evaluating.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    rx: Vec<f64>,
    /// Samples as loaded; never modified by `prepare`.
    samples: Ordinates,
    /// Evaluation channels built from `samples` by `prepare`.
    y: Ordinates,
    mode: InterpolationMode,
    repeat: Repeat,
    domain: Domain,
    duration: f64,
    /// Spline over the real channel (or magnitude for polar data).
    rsp: Option<Spline>,
    /// Spline over the imaginary channel (or unwrapped phase).
    isp: Option<Spline>,
}

impl Interpolator {
    /// Create an empty interpolator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load real samples `y(x)`. Abscissas must be ascending.
    pub fn rvectors(&mut self, y: &[f64], x: &[f64]) -> Result<()> {
        check_lengths(y.len(), x.len())?;
        self.reset(x);
        self.samples = Ordinates::Real(y.to_vec());
        self.y = self.samples.clone();
        Ok(())
    }

    /// Load complex samples `y(x)`. Abscissas must be ascending.
    pub fn cvectors(&mut self, y: &[Complex64], x: &[f64]) -> Result<()> {
        check_lengths(y.len(), x.len())?;
        self.reset(x);
        self.samples = Ordinates::Complex(y.to_vec());
        self.y = self.samples.clone();
        Ok(())
    }

    fn reset(&mut self, x: &[f64]) {
        self.rx = x.to_vec();
        self.duration = 0.0;
        self.rsp = None;
        self.isp = None;
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Check whether no samples are loaded.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Check whether the loaded samples are complex.
    pub fn is_complex(&self) -> bool {
        matches!(self.y, Ordinates::Complex(_))
    }

    /// Length of one period (`x[last] - x[0]`); zero unless prepared periodic.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Get the active evaluation mode.
    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    /// Prepare the loaded samples for evaluation.
    ///
    /// The evaluation channels are rebuilt from the loaded samples on every
    /// call, so preparing again with other settings is safe. Periodic data
    /// has its last sample forced equal to the first so the wrap is
    /// continuous. Polar data is converted to magnitude and unwrapped phase
    /// before any spline is built. Cubic mode with fewer than [`MIN_POINTS`]
    /// samples falls back to linear.
    pub fn prepare(
        &mut self,
        mode: InterpolationMode,
        repeat: Repeat,
        domain: Domain,
    ) -> Result<()> {
        self.mode = mode;
        self.repeat = repeat;
        self.domain = domain;
        self.rsp = None;
        self.isp = None;
        self.y = self.samples.clone();

        let len = self.len();
        if repeat == Repeat::Periodic && len > 0 {
            self.duration = self.rx[len - 1] - self.rx[0];
            match &mut self.y {
                Ordinates::Real(ry) => ry[len - 1] = ry[0],
                Ordinates::Complex(cy) => cy[len - 1] = cy[0],
            }
        } else {
            self.duration = 0.0;
        }

        if domain == Domain::Polar {
            if let Ordinates::Complex(cy) = &mut self.y {
                let mut phase: Vec<f64> = cy.iter().map(|c| c.arg()).collect();
                unwrap_phase(&mut phase);
                for (c, arg) in cy.iter_mut().zip(phase) {
                    *c = Complex64::new(c.norm(), arg);
                }
            }
        }

        if mode == InterpolationMode::Cubic {
            if len < MIN_POINTS {
                debug!(
                    "interpolator: {} samples are too few for a spline, using linear",
                    len
                );
                self.mode = InterpolationMode::Linear;
                return Ok(());
            }

            let boundary = match repeat {
                Repeat::Periodic => Boundary::Periodic,
                Repeat::Once => Boundary::Natural,
            };
            match &self.y {
                Ordinates::Real(ry) => {
                    self.rsp = Some(Spline::from_points(ry, &self.rx, boundary)?);
                }
                Ordinates::Complex(cy) => {
                    let re: Vec<f64> = cy.iter().map(|c| c.re).collect();
                    let im: Vec<f64> = cy.iter().map(|c| c.im).collect();
                    self.rsp = Some(Spline::from_points(&re, &self.rx, boundary)?);
                    self.isp = Some(Spline::from_points(&im, &self.rx, boundary)?);
                }
            }
        }

        Ok(())
    }

    /// Index `i` of the left sample with `x[i] <= x < x[i + 1]`.
    ///
    /// Returns 0 below the sample range and the last index at or above it.
    pub fn find_index(&self, x: f64) -> usize {
        self.rx.partition_point(|&v| v <= x).saturating_sub(1)
    }

    /// Map `x` into `[0, duration)` for periodic data.
    fn wrap(&self, x: f64) -> f64 {
        if self.repeat == Repeat::Periodic && self.duration > 0.0 {
            x - (x / self.duration).floor() * self.duration
        } else {
            x
        }
    }

    /// Interpolate real data at `x`.
    ///
    /// Complex data yields the real part of [`cinterpolate`](Self::cinterpolate).
    pub fn rinterpolate(&self, x: f64) -> f64 {
        let ry = match &self.y {
            Ordinates::Real(ry) => ry,
            Ordinates::Complex(_) => return self.cinterpolate(x).re,
        };

        match ry.len() {
            0 => return 0.0,
            1 => return ry[0],
            _ => {}
        }

        let x = self.wrap(x);
        match (self.mode, &self.rsp) {
            (InterpolationMode::Cubic, Some(spline)) => spline.evaluate(x).f0,
            (InterpolationMode::Hold, _) => ry[self.find_index(x)],
            _ => self.linear(x, ry),
        }
    }

    /// Interpolate complex data at `x`.
    ///
    /// Polar data is interpolated as (magnitude, phase) and returned in
    /// rectangular form. Real data is returned with a zero imaginary part.
    pub fn cinterpolate(&self, x: f64) -> Complex64 {
        let cy = match &self.y {
            Ordinates::Complex(cy) => cy,
            Ordinates::Real(_) => return Complex64::new(self.rinterpolate(x), 0.0),
        };

        let res = match cy.len() {
            0 => return Complex64::new(0.0, 0.0),
            1 => cy[0],
            _ => {
                let x = self.wrap(x);
                match (self.mode, &self.rsp, &self.isp) {
                    (InterpolationMode::Cubic, Some(re), Some(im)) => {
                        Complex64::new(re.evaluate(x).f0, im.evaluate(x).f0)
                    }
                    (InterpolationMode::Hold, _, _) => cy[self.find_index(x)],
                    _ => self.linear(x, cy),
                }
            }
        };

        match self.domain {
            Domain::Polar => Complex64::from_polar(res.re, res.im),
            Domain::Rectangular => res,
        }
    }

    fn linear<T>(&self, x: f64, y: &[T]) -> T
    where
        T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>,
    {
        let idx = self.find_index(x);
        if x == self.rx[idx] {
            return y[idx];
        }
        // Past the last sample the final segment's tangent is extended.
        let idx = idx.min(y.len() - 2);
        let (x1, x2) = (self.rx[idx], self.rx[idx + 1]);
        y[idx] + (y[idx + 1] - y[idx]) * ((x - x1) / (x2 - x1))
    }
}

fn check_lengths(y: usize, x: usize) -> Result<()> {
    if x == y {
        Ok(())
    } else {
        Err(Error::LengthMismatch { x, y })
    }
}

/// Remove 2π jumps from a phase sequence so consecutive values differ by at
/// most π.
pub fn unwrap_phase(phase: &mut [f64]) {
    let mut offset = 0.0;
    for i in 1..phase.len() {
        let raw = phase[i];
        let step = raw + offset - phase[i - 1];
        if step > PI {
            offset -= 2.0 * PI * ((step - PI) / (2.0 * PI)).ceil();
        } else if step < -PI {
            offset += 2.0 * PI * ((-step - PI) / (2.0 * PI)).ceil();
        }
        phase[i] = raw + offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Interpolator {
        let mut ip = Interpolator::new();
        ip.rvectors(&[0.0, 10.0, 20.0, 40.0], &[0.0, 1.0, 2.0, 3.0])
            .unwrap();
        ip
    }

    #[test]
    fn test_empty_and_single_sample() {
        let mut ip = Interpolator::new();
        assert_eq!(ip.rinterpolate(1.0), 0.0);
        assert_eq!(ip.cinterpolate(1.0), Complex64::new(0.0, 0.0));

        ip.rvectors(&[3.5], &[2.0]).unwrap();
        ip.prepare(InterpolationMode::Linear, Repeat::Once, Domain::Rectangular)
            .unwrap();
        assert_eq!(ip.rinterpolate(-5.0), 3.5);
        assert_eq!(ip.rinterpolate(5.0), 3.5);
    }

    #[test]
    fn test_find_index() {
        let ip = ramp();
        assert_eq!(ip.find_index(-1.0), 0);
        assert_eq!(ip.find_index(0.0), 0);
        assert_eq!(ip.find_index(0.5), 0);
        assert_eq!(ip.find_index(1.0), 1);
        assert_eq!(ip.find_index(2.9), 2);
        assert_eq!(ip.find_index(3.0), 3);
        assert_eq!(ip.find_index(10.0), 3);
    }

    #[test]
    fn test_linear_inside_and_on_samples() {
        let mut ip = ramp();
        ip.prepare(InterpolationMode::Linear, Repeat::Once, Domain::Rectangular)
            .unwrap();
        assert_eq!(ip.rinterpolate(2.0), 20.0);
        assert!((ip.rinterpolate(0.25) - 2.5).abs() < 1e-12);
        assert!((ip.rinterpolate(2.5) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_extrapolates_boundary_tangents() {
        let mut ip = ramp();
        ip.prepare(InterpolationMode::Linear, Repeat::Once, Domain::Rectangular)
            .unwrap();
        // Left: first segment slope 10; right: last segment slope 20.
        assert!((ip.rinterpolate(-1.0) + 10.0).abs() < 1e-12);
        assert!((ip.rinterpolate(4.0) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_hold() {
        let mut ip = ramp();
        ip.prepare(InterpolationMode::Hold, Repeat::Once, Domain::Rectangular)
            .unwrap();
        assert_eq!(ip.rinterpolate(0.99), 0.0);
        assert_eq!(ip.rinterpolate(1.5), 10.0);
        assert_eq!(ip.rinterpolate(7.0), 40.0);
        assert_eq!(ip.rinterpolate(-7.0), 0.0);
    }

    #[test]
    fn test_cubic_hits_samples() {
        let mut ip = ramp();
        ip.prepare(InterpolationMode::Cubic, Repeat::Once, Domain::Rectangular)
            .unwrap();
        for (x, y) in [(0.0, 0.0), (1.0, 10.0), (2.0, 20.0), (3.0, 40.0)] {
            assert!((ip.rinterpolate(x) - y).abs() < 1e-10);
        }
    }

    #[test]
    fn test_cubic_falls_back_to_linear() {
        let mut ip = Interpolator::new();
        ip.rvectors(&[0.0, 2.0], &[0.0, 1.0]).unwrap();
        ip.prepare(InterpolationMode::Cubic, Repeat::Once, Domain::Rectangular)
            .unwrap();
        assert_eq!(ip.mode(), InterpolationMode::Linear);
        assert!((ip.rinterpolate(0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_periodic_wrap() {
        let x = [0.0, 0.25, 0.5, 0.75, 1.0];
        let y = [0.0, 1.0, 0.0, -1.0, 5.0];
        for mode in [
            InterpolationMode::Linear,
            InterpolationMode::Cubic,
            InterpolationMode::Hold,
        ] {
            let mut ip = Interpolator::new();
            ip.rvectors(&y, &x).unwrap();
            ip.prepare(mode, Repeat::Periodic, Domain::Rectangular)
                .unwrap();
            assert!((ip.duration() - 1.0).abs() < 1e-15);

            let a = ip.rinterpolate(0.3);
            let b = ip.rinterpolate(1.3);
            let c = ip.rinterpolate(-0.7);
            assert!((a - b).abs() < 1e-12, "{:?}: {} vs {}", mode, a, b);
            assert!((a - c).abs() < 1e-12, "{:?}: {} vs {}", mode, a, c);
        }
    }

    #[test]
    fn test_periodic_closes_cycle() {
        let mut ip = Interpolator::new();
        ip.rvectors(&[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0]).unwrap();
        ip.prepare(InterpolationMode::Linear, Repeat::Periodic, Domain::Rectangular)
            .unwrap();
        // The last sample is forced to the first value.
        assert!((ip.rinterpolate(1.5) - 1.5).abs() < 1e-12);
        assert!((ip.rinterpolate(2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_periodic_wrap_is_floored_from_zero() {
        let mut ip = Interpolator::new();
        ip.rvectors(&[0.0, 1.0, 0.0], &[1.0, 2.0, 3.0]).unwrap();
        ip.prepare(InterpolationMode::Linear, Repeat::Periodic, Domain::Rectangular)
            .unwrap();
        assert!((ip.duration() - 2.0).abs() < 1e-15);

        // 0.5 is already inside [0, 2): it stays below the samples and
        // follows the first segment's tangent.
        assert!((ip.rinterpolate(0.5) + 0.5).abs() < 1e-12);
        // 4.5 wraps to 0.5.
        assert!((ip.rinterpolate(4.5) + 0.5).abs() < 1e-12);
        // -0.5 wraps to 1.5.
        assert!((ip.rinterpolate(-0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_again_starts_from_loaded_samples() {
        let y = [
            Complex64::new(1.0, 1.0),
            Complex64::new(0.0, 2.0),
            Complex64::new(-1.0, 1.0),
        ];
        let mut ip = Interpolator::new();
        ip.cvectors(&y, &[0.0, 1.0, 2.0]).unwrap();

        ip.prepare(InterpolationMode::Linear, Repeat::Once, Domain::Polar)
            .unwrap();
        let first = ip.cinterpolate(1.0);
        assert!((first - y[1]).norm() < 1e-12, "linear: {}", first);

        ip.prepare(InterpolationMode::Cubic, Repeat::Once, Domain::Polar)
            .unwrap();
        let second = ip.cinterpolate(1.0);
        assert!((second - y[1]).norm() < 1e-12, "cubic: {}", second);

        // A periodic prepare must not leak its closed cycle into a later one.
        ip.prepare(InterpolationMode::Linear, Repeat::Periodic, Domain::Rectangular)
            .unwrap();
        ip.prepare(InterpolationMode::Linear, Repeat::Once, Domain::Rectangular)
            .unwrap();
        assert!((ip.cinterpolate(2.0) - y[2]).norm() < 1e-12);
    }

    #[test]
    fn test_complex_rectangular_linear() {
        let mut ip = Interpolator::new();
        let y = [Complex64::new(0.0, 0.0), Complex64::new(2.0, -4.0)];
        ip.cvectors(&y, &[0.0, 1.0]).unwrap();
        ip.prepare(InterpolationMode::Linear, Repeat::Once, Domain::Rectangular)
            .unwrap();
        let v = ip.cinterpolate(0.5);
        assert!((v - Complex64::new(1.0, -2.0)).norm() < 1e-12);
        assert!(ip.is_complex());
        assert!((ip.rinterpolate(0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polar_unwrap_is_continuous() {
        // Unit-magnitude samples stepping through the ±π branch cut.
        let phases = [2.6, 2.9, 3.1, -3.0, -2.7, -2.4];
        let x: Vec<f64> = (0..phases.len()).map(|i| i as f64).collect();
        let y: Vec<Complex64> = phases.iter().map(|p| Complex64::from_polar(1.0, *p)).collect();

        for mode in [InterpolationMode::Linear, InterpolationMode::Cubic] {
            let mut ip = Interpolator::new();
            ip.cvectors(&y, &x).unwrap();
            ip.prepare(mode, Repeat::Once, Domain::Polar).unwrap();

            let mut prev = ip.cinterpolate(2.0);
            let mut t = 2.0;
            while t < 4.0 {
                t += 0.05;
                let v = ip.cinterpolate(t);
                assert!((v.norm() - 1.0).abs() < 1e-2, "{:?}: |v({})| = {}", mode, t, v.norm());
                assert!((v - prev).norm() < 0.05, "{:?}: jump at {}", mode, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_unwrap_phase() {
        let mut p = [3.0, -3.0, -2.9, 3.1];
        unwrap_phase(&mut p);
        for w in p.windows(2) {
            assert!((w[1] - w[0]).abs() <= PI);
        }
        assert!((p[1] - (-3.0 + 2.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let mut ip = Interpolator::new();
        assert_eq!(
            ip.rvectors(&[1.0], &[0.0, 1.0]).unwrap_err(),
            Error::LengthMismatch { x: 2, y: 1 }
        );
    }
}
