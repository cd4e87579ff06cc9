//! Piecewise-cubic spline interpolation.
//!
//! A spline through `n + 1` samples `(x_i, y_i)` is stored as `n + 1`
//! coefficient quadruples. On segment `i`, with `dx = t - x_i`:
//!
//! ```text
//! s(t) = f0[i] + f1[i]*dx + f2[i]*dx² + f3[i]*dx³
//! ```
//!
//! The coefficients are derived from the second derivatives `m_i` at the
//! knots, which are solved once in [`Spline::construct`]:
//! - natural: `m_0 = m_n = 0`
//! - clamped: first derivatives at both ends are prescribed
//! - periodic: `m_0 = m_n` and the slope wraps from the last knot into the first
//!
//! The trailing quadruple (index `n`) describes evaluation past the last
//! knot. For periodic splines it mirrors the first segment so the curve is C²
//! across the wrap.

use log::warn;

use crate::error::{Error, Result};

/// Minimum number of samples a spline can be built from.
pub const MIN_POINTS: usize = 3;

/// Boundary condition applied at the ends of the sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Zero curvature at both ends.
    #[default]
    Natural,
    /// Caller-supplied first derivatives at both ends.
    Clamped,
    /// Value, slope and curvature wrap from the last sample to the first.
    Periodic,
}

/// Spline value and its first two derivatives at one abscissa.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Poly {
    /// Function value.
    pub f0: f64,
    /// First derivative.
    pub f1: f64,
    /// Second derivative.
    pub f2: f64,
}

/// A piecewise-cubic interpolant over ordered samples.
#[derive(Debug, Clone, Default)]
pub struct Spline {
    boundary: Boundary,
    /// Sample abscissas (knots).
    x: Vec<f64>,
    /// Sample values; doubles as the constant coefficient.
    f0: Vec<f64>,
    f1: Vec<f64>,
    f2: Vec<f64>,
    f3: Vec<f64>,
    /// Clamped slope at the first knot.
    d0: f64,
    /// Clamped slope at the last knot.
    dn: f64,
}

impl Spline {
    /// Create an empty spline with the given boundary condition.
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            ..Default::default()
        }
    }

    /// Build and solve a spline through `(x, y)` in one step.
    pub fn from_points(y: &[f64], x: &[f64], boundary: Boundary) -> Result<Self> {
        let mut spline = Self::new(boundary);
        spline.vectors(y, x)?;
        spline.construct();
        Ok(spline)
    }

    /// Get the boundary condition.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Change the boundary condition. Takes effect on the next [`construct`](Self::construct).
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
    }

    /// Set the end slopes used by [`Boundary::Clamped`].
    pub fn set_derivatives(&mut self, d0: f64, dn: f64) {
        self.d0 = d0;
        self.dn = dn;
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check whether the spline has no samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check whether coefficients have been solved for the current samples.
    pub fn is_constructed(&self) -> bool {
        !self.f1.is_empty()
    }

    /// Load new samples, discarding previously solved coefficients.
    ///
    /// Requires at least [`MIN_POINTS`] samples and equal-length series.
    /// Abscissas must be ascending.
    pub fn vectors(&mut self, y: &[f64], x: &[f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(Error::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.len() < MIN_POINTS {
            return Err(Error::TooFewPoints {
                required: MIN_POINTS,
                actual: x.len(),
            });
        }

        self.x = x.to_vec();
        self.f0 = y.to_vec();
        self.f1.clear();
        self.f2.clear();
        self.f3.clear();
        Ok(())
    }

    /// Solve the spline coefficients for the loaded samples.
    ///
    /// A zero-width step (duplicate abscissa) is reported through `log` and
    /// construction carries on; the coefficients around that step are not
    /// finite.
    pub fn construct(&mut self) {
        if self.x.len() < MIN_POINTS {
            return;
        }

        let n = self.x.len() - 1;
        let h: Vec<f64> = self.x.windows(2).map(|w| w[1] - w[0]).collect();
        for (i, step) in h.iter().enumerate() {
            if *step == 0.0 {
                warn!(
                    "spline: duplicate abscissa x[{}] = x[{}] = {}, slope is undefined",
                    i,
                    i + 1,
                    self.x[i]
                );
            }
        }

        let m = match self.boundary {
            Boundary::Natural | Boundary::Clamped => self.open_curvatures(&h),
            Boundary::Periodic => self.periodic_curvatures(&h),
        };

        let y = &self.f0;
        let mut f1 = vec![0.0; n + 1];
        let mut f2 = vec![0.0; n + 1];
        let mut f3 = vec![0.0; n + 1];
        for i in 0..n {
            f1[i] = (y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            f2[i] = m[i] / 2.0;
            f3[i] = (m[i + 1] - m[i]) / (6.0 * h[i]);
        }

        match self.boundary {
            Boundary::Periodic => {
                f1[n] = f1[0];
                f2[n] = f2[0];
                f3[n] = f3[0];
            }
            Boundary::Natural | Boundary::Clamped => {
                let hl = h[n - 1];
                f1[n] = f1[n - 1] + (2.0 * f2[n - 1] + 3.0 * f3[n - 1] * hl) * hl;
                f2[n] = m[n] / 2.0;
                f3[n] = 0.0;
            }
        }

        self.f1 = f1;
        self.f2 = f2;
        self.f3 = f3;
    }

    /// Second derivatives for natural and clamped boundaries.
    fn open_curvatures(&self, h: &[f64]) -> Vec<f64> {
        let y = &self.f0;
        let n = h.len();
        let mut sub = vec![0.0; n + 1];
        let mut diag = vec![1.0; n + 1];
        let mut sup = vec![0.0; n + 1];
        let mut rhs = vec![0.0; n + 1];

        for i in 1..n {
            sub[i] = h[i - 1];
            diag[i] = 2.0 * (h[i - 1] + h[i]);
            sup[i] = h[i];
            rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        if self.boundary == Boundary::Clamped {
            diag[0] = 2.0 * h[0];
            sup[0] = h[0];
            rhs[0] = 6.0 * ((y[1] - y[0]) / h[0] - self.d0);
            sub[n] = h[n - 1];
            diag[n] = 2.0 * h[n - 1];
            rhs[n] = 6.0 * (self.dn - (y[n] - y[n - 1]) / h[n - 1]);
        }

        solve_tridiagonal(&sub, &diag, &sup, &rhs)
    }

    /// Second derivatives for a periodic boundary.
    ///
    /// The unknowns are `m_0..m_{n-1}` with `m_n = m_0`. Two segments are
    /// solved directly; longer chains form a cyclic tridiagonal system that is
    /// reduced to two ordinary ones (Sherman-Morrison).
    fn periodic_curvatures(&self, h: &[f64]) -> Vec<f64> {
        let y = &self.f0;
        let n = h.len();

        let slope = |i: usize| (y[i + 1] - y[i]) / h[i];
        let mut sub = vec![0.0; n];
        let mut diag = vec![0.0; n];
        let mut sup = vec![0.0; n];
        let mut rhs = vec![0.0; n];
        for i in 0..n {
            let prev = (i + n - 1) % n;
            sub[i] = h[prev];
            diag[i] = 2.0 * (h[prev] + h[i]);
            sup[i] = h[i];
            rhs[i] = 6.0 * (slope(i) - slope(prev));
        }

        let mut m = match n {
            1 => vec![0.0],
            2 => {
                // Both off-diagonal couplings land on the other unknown.
                let off0 = sub[0] + sup[0];
                let off1 = sub[1] + sup[1];
                let det = diag[0] * diag[1] - off0 * off1;
                vec![
                    (rhs[0] * diag[1] - off0 * rhs[1]) / det,
                    (diag[0] * rhs[1] - off1 * rhs[0]) / det,
                ]
            }
            _ => {
                let beta = sub[0];
                let alpha = sup[n - 1];
                let gamma = -diag[0];

                let mut bb = diag.clone();
                bb[0] = diag[0] - gamma;
                bb[n - 1] = diag[n - 1] - alpha * beta / gamma;

                let mut x = solve_tridiagonal(&sub, &bb, &sup, &rhs);

                let mut u = vec![0.0; n];
                u[0] = gamma;
                u[n - 1] = alpha;
                let z = solve_tridiagonal(&sub, &bb, &sup, &u);

                let fact = (x[0] + beta * x[n - 1] / gamma)
                    / (1.0 + z[0] + beta * z[n - 1] / gamma);
                for (xi, zi) in x.iter_mut().zip(&z) {
                    *xi -= fact * zi;
                }
                x
            }
        };

        m.push(m[0]);
        m
    }

    /// Evaluate the spline and its first two derivatives at `t`.
    ///
    /// Periodic splines fold `t` into the sample range first. Left of the
    /// first knot the first segment's tangent is extended linearly; right of
    /// the last knot the trailing coefficients apply.
    pub fn evaluate(&self, t: f64) -> Poly {
        if !self.is_constructed() {
            return Poly::default();
        }

        let n = self.x.len() - 1;
        let (first, last) = (self.x[0], self.x[n]);
        let mut t = t;
        if self.boundary == Boundary::Periodic {
            let period = last - first;
            if period > 0.0 {
                if t > last {
                    t -= ((t - last) / period).ceil() * period;
                }
                if t < first {
                    t += ((first - t) / period).ceil() * period;
                }
                while t > last {
                    t -= period;
                }
                while t < first {
                    t += period;
                }
            }
        }

        let upper = self.x.partition_point(|&xi| xi <= t);
        if upper == 0 {
            let dx = t - first;
            return Poly {
                f0: self.f0[0] + dx * self.f1[0],
                f1: self.f1[0],
                f2: 0.0,
            };
        }

        let i = upper - 1;
        let dx = t - self.x[i];
        let (c0, c1, c2, c3) = (self.f0[i], self.f1[i], self.f2[i], self.f3[i]);
        Poly {
            f0: ((c3 * dx + c2) * dx + c1) * dx + c0,
            f1: (3.0 * c3 * dx + 2.0 * c2) * dx + c1,
            f2: 6.0 * c3 * dx + 2.0 * c2,
        }
    }
}

/// Thomas algorithm for a tridiagonal system.
///
/// `sub[0]` and `sup[last]` are ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let den = diag[i] - sub[i] * c[i - 1];
        c[i] = sup[i] / den;
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / den;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    x
}
