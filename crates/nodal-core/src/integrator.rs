//! Integration collaborator for charge-storage companion models.
//!
//! An element records the charge of a storage element into state slot
//! `qstate`; the integrator turns the charge history into a companion pair:
//! an equivalent conductance `geq` and a history current `ceq`, such that the
//! branch current is `i = geq * v + ceq` for a linear capacitance. The total
//! integrated current is written back to slot `qstate + 1`.
//!
//! The multistep formula is the integrator's choice; [`StepIntegrator`] is a
//! fixed-step reference implementation.

use crate::states::StateVars;

/// Companion-model pair produced by one integration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Companion {
    /// Equivalent conductance.
    pub geq: f64,
    /// History current.
    pub ceq: f64,
}

/// Turns a charge history into companion-model terms.
pub trait Integrator {
    /// Integrate the charge in slot `qstate` for capacitance `cap`.
    ///
    /// Must store the total current `dq/dt` at the present time point in
    /// slot `qstate + 1`.
    fn integrate(&self, states: &mut StateVars, qstate: usize, cap: f64) -> Companion;

    /// Equivalent conductance of `cap` without touching any state.
    fn conductor(&self, cap: f64) -> f64;
}

/// Integration method for [`StepIntegrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMethod {
    /// Backward Euler (first order, A-stable).
    #[default]
    BackwardEuler,
    /// Trapezoidal (second order, A-stable).
    Trapezoidal,
}

/// Fixed-step integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepIntegrator {
    /// Integration method.
    pub method: IntegrationMethod,
    /// Time step (s).
    pub step: f64,
}

impl StepIntegrator {
    /// Create an integrator for step size `step`.
    pub fn new(method: IntegrationMethod, step: f64) -> Self {
        Self { method, step }
    }

    /// Coefficient applied to the present charge.
    fn c0(&self) -> f64 {
        match self.method {
            IntegrationMethod::BackwardEuler => 1.0 / self.step,
            IntegrationMethod::Trapezoidal => 2.0 / self.step,
        }
    }
}

impl Integrator for StepIntegrator {
    fn integrate(&self, states: &mut StateVars, qstate: usize, cap: f64) -> Companion {
        let cstate = qstate + 1;
        let c0 = self.c0();
        let q_prev = states.get(qstate, 1);

        // BE:   i = (q - q')/h
        // TRAP: i = 2(q - q')/h - i'
        let ceq = match self.method {
            IntegrationMethod::BackwardEuler => -c0 * q_prev,
            IntegrationMethod::Trapezoidal => -c0 * q_prev - states.get(cstate, 1),
        };

        let current = c0 * states.get(qstate, 0) + ceq;
        states.set(cstate, current, 0);

        Companion {
            geq: cap * c0,
            ceq,
        }
    }

    fn conductor(&self, cap: f64) -> f64 {
        cap * self.c0()
    }
}
