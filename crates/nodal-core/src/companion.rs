//! Transient companion stamps for charge-storage elements.
//!
//! A charge `q(v)` between two ports is replaced at each time point by a
//! conductance `g` in parallel with a current source. The charge is recorded
//! in state slot `qstate`; the [`Integrator`] leaves the total current in slot
//! `qstate + 1`. The stamped residual is
//!
//! ```text
//! i = pol * (i_total - g * v)
//! ```
//!
//! so that `g * v + i` reproduces `i_total` at the present operating point.

use crate::element::Element;
use crate::integrator::Integrator;

impl Element {
    /// Companion stamp of a charge between `pos` and `neg`.
    #[allow(clippy::too_many_arguments)]
    pub fn transient_capacitance(
        &mut self,
        integrator: &dyn Integrator,
        qstate: usize,
        pos: usize,
        neg: usize,
        cap: f64,
        voltage: f64,
        charge: f64,
    ) {
        let g = self.integrate_charge(integrator, qstate, cap, charge);
        self.conductance(pos, neg, g);

        let i = self.polarity().sign() * (self.state(qstate + 1, 0) - g * voltage);
        self.add_i(pos, -i);
        self.add_i(neg, i);
    }

    /// Companion stamp of a charge from `node` to ground.
    pub fn transient_capacitance_node(
        &mut self,
        integrator: &dyn Integrator,
        qstate: usize,
        node: usize,
        cap: f64,
        voltage: f64,
        charge: f64,
    ) {
        let g = self.integrate_charge(integrator, qstate, cap, charge);
        self.add_y(node, node, g);

        let i = self.polarity().sign() * (self.state(qstate + 1, 0) - g * voltage);
        self.add_i(node, -i);
    }

    /// Current-only stamp of a charge between `qpos` and `qneg`.
    pub fn transient_capacitance_q(
        &mut self,
        integrator: &dyn Integrator,
        qstate: usize,
        qpos: usize,
        qneg: usize,
        charge: f64,
    ) {
        self.integrate_charge(integrator, qstate, 0.0, charge);

        let i = self.polarity().sign() * self.state(qstate + 1, 0);
        self.add_i(qpos, -i);
        self.add_i(qneg, i);
    }

    /// Current-only stamp of a charge from `qpos` to ground.
    pub fn transient_capacitance_q_node(
        &mut self,
        integrator: &dyn Integrator,
        qstate: usize,
        qpos: usize,
        charge: f64,
    ) {
        self.integrate_charge(integrator, qstate, 0.0, charge);

        let i = self.polarity().sign() * self.state(qstate + 1, 0);
        self.add_i(qpos, -i);
    }

    /// Jacobian-only stamp of a charge between `qpos` and `qneg` that
    /// depends on the voltage between `vpos` and `vneg`.
    #[allow(clippy::too_many_arguments)]
    pub fn transient_capacitance_c(
        &mut self,
        integrator: &dyn Integrator,
        qpos: usize,
        qneg: usize,
        vpos: usize,
        vneg: usize,
        cap: f64,
        voltage: f64,
    ) {
        let g = integrator.conductor(cap);
        self.add_y(qpos, vpos, g);
        self.add_y(qneg, vneg, g);
        self.add_y(qpos, vneg, -g);
        self.add_y(qneg, vpos, -g);

        let i = self.polarity().sign() * g * voltage;
        self.add_i(qpos, i);
        self.add_i(qneg, -i);
    }

    /// Jacobian-only stamp of a grounded charge at `qpos` depending on the
    /// grounded voltage at `vpos`.
    pub fn transient_capacitance_c2v(
        &mut self,
        integrator: &dyn Integrator,
        qpos: usize,
        vpos: usize,
        cap: f64,
        voltage: f64,
    ) {
        let g = integrator.conductor(cap);
        self.add_y(qpos, vpos, g);

        let i = self.polarity().sign() * g * voltage;
        self.add_i(qpos, i);
    }

    /// Jacobian-only stamp of a charge between `qpos` and `qneg` depending
    /// on the grounded voltage at `vpos`.
    pub fn transient_capacitance_c2q(
        &mut self,
        integrator: &dyn Integrator,
        qpos: usize,
        qneg: usize,
        vpos: usize,
        cap: f64,
        voltage: f64,
    ) {
        let g = integrator.conductor(cap);
        self.add_y(qpos, vpos, g);
        self.add_y(qneg, vpos, -g);

        let i = self.polarity().sign() * g * voltage;
        self.add_i(qpos, i);
        self.add_i(qneg, -i);
    }

    fn integrate_charge(
        &mut self,
        integrator: &dyn Integrator,
        qstate: usize,
        cap: f64,
        charge: f64,
    ) -> f64 {
        self.set_state(qstate, charge, 0);
        self.integrate(integrator, qstate, cap).geq
    }
}
