//! Circuit element state.
//!
//! An [`Element`] owns its ports, its matrix families and its histories.
//! Device models drive it through the stamping primitives once per
//! evaluation point; the solver reads the matrices back and writes the
//! solution into `V` and `J`.
//!
//! Port and branch indices are local to the element. Indexing outside the
//! allocated dimensions is a programming error and panics.

use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::history::{History, HistoryParams};
use crate::integrator::{Companion, Integrator};
use crate::mna::{HbBuffers, MnaMatrices, empty_matrix, realloc_matrix};
use crate::node::{ElementId, Node};
use crate::states::StateVars;
use crate::values::ValueMap;

/// Sign applied to charge and current stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
}

impl Polarity {
    /// +1.0 or -1.0.
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

/// Per-element state shared by every device model.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    id: ElementId,
    size: usize,
    nodes: Vec<Node>,
    /// Declared internal voltage sources (branch rows).
    vsources: usize,
    /// Global branch row of the first voltage source.
    vsource: usize,
    internal_vsource: bool,
    /// Noise sources beyond the ports.
    nsources: usize,
    enabled: bool,
    inserted: bool,
    nonlinear: bool,
    probe: bool,
    subcircuit: String,
    polarity: Polarity,
    s: DMatrix<Complex64>,
    n: DMatrix<Complex64>,
    mna: MnaMatrices,
    hb: HbBuffers,
    states: StateVars,
    histories: Vec<History>,
    history_age: f64,
    operating_points: ValueMap,
    characteristics: ValueMap,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            name: String::new(),
            id: ElementId::default(),
            size: 0,
            nodes: Vec::new(),
            vsources: 0,
            vsource: 0,
            internal_vsource: false,
            nsources: 0,
            enabled: true,
            inserted: false,
            nonlinear: false,
            probe: false,
            subcircuit: String::new(),
            polarity: Polarity::Positive,
            s: empty_matrix(),
            n: empty_matrix(),
            mna: MnaMatrices::default(),
            hb: HbBuffers::default(),
            states: StateVars::default(),
            histories: Vec::new(),
            history_age: 0.0,
            operating_points: ValueMap::new(),
            characteristics: ValueMap::new(),
        }
    }
}

/// Get/set/add accessors for one entry of a matrix.
macro_rules! matrix_entry {
    ($what:literal, $get:ident, $set:ident, $add:ident, $($field:ident).+) => {
        #[doc = concat!("Get entry `(r, c)` of ", $what, ".")]
        pub fn $get(&self, r: usize, c: usize) -> Complex64 {
            self.$($field).+[(r, c)]
        }

        #[doc = concat!("Overwrite entry `(r, c)` of ", $what, ".")]
        pub fn $set(&mut self, r: usize, c: usize, value: impl Into<Complex64>) {
            self.$($field).+[(r, c)] = value.into();
        }

        #[doc = concat!("Accumulate into entry `(r, c)` of ", $what, ".")]
        pub fn $add(&mut self, r: usize, c: usize, value: impl Into<Complex64>) {
            self.$($field).+[(r, c)] += value.into();
        }
    };
}

/// Get/set/add accessors for one entry of a vector.
macro_rules! vector_entry {
    ($what:literal, $get:ident, $set:ident, $add:ident, $($field:ident).+) => {
        #[doc = concat!("Get entry `r` of ", $what, ".")]
        pub fn $get(&self, r: usize) -> Complex64 {
            self.$($field).+[r]
        }

        #[doc = concat!("Overwrite entry `r` of ", $what, ".")]
        pub fn $set(&mut self, r: usize, value: impl Into<Complex64>) {
            self.$($field).+[r] = value.into();
        }

        #[doc = concat!("Accumulate into entry `r` of ", $what, ".")]
        pub fn $add(&mut self, r: usize, value: impl Into<Complex64>) {
            self.$($field).+[r] += value.into();
        }
    };
}

impl Element {
    /// Create an unsized element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create an element with `size` ports and `vsources` branch rows.
    pub fn with_size(name: impl Into<String>, size: usize, vsources: usize) -> Self {
        let mut element = Self::new(name);
        element.vsources = vsources;
        element.set_size(size);
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Assign the netlist handle; every node's back-reference follows.
    pub fn set_id(&mut self, id: ElementId) {
        self.id = id;
        for node in &mut self.nodes {
            node.set_owner(id);
        }
    }

    // ---- Sizing ----

    /// Number of ports.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Change the port count.
    ///
    /// Setting the current size is a no-op. Any other value discards every
    /// node and matrix; a non-zero size then gets fresh unnamed nodes and
    /// zeroed S, noise and MNA storage.
    pub fn set_size(&mut self, size: usize) {
        if size == self.size {
            return;
        }

        self.size = size;
        self.nodes.clear();
        self.s = empty_matrix();
        self.n = empty_matrix();
        self.mna.free();
        self.hb.free();

        if size > 0 {
            self.nodes = (0..size).map(|port| Node::unnamed(port, self.id)).collect();
            self.alloc_matrix_s();
            self.alloc_matrix_n(self.vsources);
            self.alloc_matrix_mna();
        }
    }

    /// Number of internal voltage sources.
    pub fn voltage_sources(&self) -> usize {
        self.vsources
    }

    /// Change the number of internal voltage sources.
    ///
    /// A sized element gets fresh MNA and noise storage for the new count.
    pub fn set_voltage_sources(&mut self, vsources: usize) {
        if vsources == self.vsources {
            return;
        }
        self.vsources = vsources;
        if self.size > 0 {
            self.alloc_matrix_mna();
            self.alloc_matrix_n(vsources);
        }
    }

    /// Global branch row of the first voltage source.
    pub fn voltage_source_index(&self) -> usize {
        self.vsource
    }

    pub fn set_voltage_source_index(&mut self, index: usize) {
        self.vsource = index;
    }

    pub fn is_internal_voltage_source(&self) -> bool {
        self.internal_vsource
    }

    pub fn set_internal_voltage_source(&mut self, internal: bool) {
        self.internal_vsource = internal;
    }

    /// Number of noise sources beyond the ports.
    pub fn noise_sources(&self) -> usize {
        self.nsources
    }

    // ---- Nodes ----

    /// Name port `port`.
    pub fn set_node(&mut self, port: usize, name: impl Into<String>, internal: bool) {
        self.nodes[port] = Node::new(name, port, internal, self.id);
    }

    pub fn node(&self, port: usize) -> &Node {
        &self.nodes[port]
    }

    pub fn node_mut(&mut self, port: usize) -> &mut Node {
        &mut self.nodes[port]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    // ---- Flags ----

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check whether the element was inserted by the netlist rather than the user.
    pub fn is_inserted(&self) -> bool {
        self.inserted
    }

    pub fn set_inserted(&mut self, inserted: bool) {
        self.inserted = inserted;
    }

    pub fn is_nonlinear(&self) -> bool {
        self.nonlinear
    }

    pub fn set_nonlinear(&mut self, nonlinear: bool) {
        self.nonlinear = nonlinear;
    }

    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn set_probe(&mut self, probe: bool) {
        self.probe = probe;
    }

    /// Name of the subcircuit instance this element belongs to, empty at top level.
    pub fn subcircuit(&self) -> &str {
        &self.subcircuit
    }

    pub fn set_subcircuit(&mut self, subcircuit: impl Into<String>) {
        self.subcircuit = subcircuit.into();
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.polarity = polarity;
    }

    // ---- Allocation ----

    /// Allocate (or zero) the S-parameter matrix.
    pub fn alloc_matrix_s(&mut self) {
        if realloc_matrix(&mut self.s, self.size, self.size) {
            debug!("{}: S matrix {}x{}", self.name, self.size, self.size);
        }
    }

    /// Allocate (or zero) the noise correlation matrix for `sources` extra sources.
    pub fn alloc_matrix_n(&mut self, sources: usize) {
        self.nsources = sources;
        let dim = self.size + sources;
        if realloc_matrix(&mut self.n, dim, dim) {
            debug!("{}: noise matrix {}x{}", self.name, dim, dim);
        }
    }

    /// Allocate (or zero) the MNA matrix set.
    pub fn alloc_matrix_mna(&mut self) {
        self.mna.alloc(self.size, self.vsources);
    }

    /// Zero the MNA stamps ahead of a new evaluation point, keeping `V` and `J`.
    pub fn clear_stamps(&mut self) {
        self.mna.clear_stamps();
    }

    pub fn free_matrix_mna(&mut self) {
        self.mna.free();
    }

    /// Allocate (or zero) the harmonic-balance buffers.
    pub fn alloc_matrix_hb(&mut self) {
        self.hb.alloc(self.size);
    }

    pub fn free_matrix_hb(&mut self) {
        self.hb.free();
    }

    // ---- Entry access ----

    matrix_entry!("the S-parameter matrix", get_s, set_s, add_s, s);
    matrix_entry!("the noise correlation matrix", get_n, set_n, add_n, n);
    matrix_entry!("the conductance matrix Y", get_y, set_y, add_y, mna.y);
    matrix_entry!("the port-to-branch matrix B", get_b, set_b, add_b, mna.b);
    matrix_entry!("the branch-to-port matrix C", get_c, set_c, add_c, mna.c);
    matrix_entry!("the branch matrix D", get_d, set_d, add_d, mna.d);
    matrix_entry!("the charge Jacobian QV", get_qv, set_qv, add_qv, hb.qv);

    vector_entry!("the port current vector I", get_i, set_i, add_i, mna.i);
    vector_entry!("the port voltage vector V", get_v, set_v, add_v, mna.v);
    vector_entry!("the branch voltage vector E", get_e, set_e, add_e, mna.e);
    vector_entry!("the branch current vector J", get_j, set_j, add_j, mna.j);
    vector_entry!("the charge vector Q", get_q, set_q, add_q, hb.q);
    vector_entry!("the capacitive current vector CV", get_cv, set_cv, add_cv, hb.cv);
    vector_entry!("the conductive current vector GV", get_gv, set_gv, add_gv, hb.gv);

    // ---- Whole matrices ----

    pub fn matrix_s(&self) -> &DMatrix<Complex64> {
        &self.s
    }

    /// Replace the S-parameter matrix; it must be `size×size`.
    pub fn set_matrix_s(&mut self, s: DMatrix<Complex64>) -> Result<()> {
        check_shape("S", (self.size, self.size), &s)?;
        self.s = s;
        Ok(())
    }

    pub fn matrix_n(&self) -> &DMatrix<Complex64> {
        &self.n
    }

    /// Replace the noise correlation matrix.
    ///
    /// It must be square over the ports plus the noise sources.
    pub fn set_matrix_n(&mut self, n: DMatrix<Complex64>) -> Result<()> {
        let dim = self.size + self.nsources;
        check_shape("noise", (dim, dim), &n)?;
        self.n = n;
        Ok(())
    }

    pub fn matrix_y(&self) -> &DMatrix<Complex64> {
        &self.mna.y
    }

    /// Replace the conductance matrix; it must be `size×size`.
    pub fn set_matrix_y(&mut self, y: DMatrix<Complex64>) -> Result<()> {
        check_shape("Y", (self.size, self.size), &y)?;
        self.mna.y = y;
        Ok(())
    }

    /// The MNA matrix set.
    pub fn mna(&self) -> &MnaMatrices {
        &self.mna
    }

    pub fn mna_mut(&mut self) -> &mut MnaMatrices {
        &mut self.mna
    }

    /// The harmonic-balance buffers.
    pub fn hb(&self) -> &HbBuffers {
        &self.hb
    }

    // ---- Stamps ----

    /// Stamp an ideal voltage source `V(pos) - V(neg) = value` on branch `n`.
    pub fn voltage_source(
        &mut self,
        n: usize,
        pos: usize,
        neg: usize,
        value: impl Into<Complex64>,
    ) {
        self.mna.stamp_voltage_source(n, pos, neg, value.into());
    }

    /// Stamp a conductance between ports `pos` and `neg`.
    pub fn conductance(&mut self, pos: usize, neg: usize, g: impl Into<Complex64>) {
        let g = g.into();
        self.add_y(pos, pos, g);
        self.add_y(neg, neg, g);
        self.add_y(pos, neg, -g);
        self.add_y(neg, pos, -g);
    }

    /// Stamp a current `i` flowing from `pos` through the element to `neg`.
    pub fn current(&mut self, pos: usize, neg: usize, i: impl Into<Complex64>) {
        let i = i.into();
        self.add_i(pos, -i);
        self.add_i(neg, i);
    }

    // ---- State variables ----

    /// Reset the state variables to `count` zeroed slots.
    pub fn init_states(&mut self, count: usize) {
        self.states.init(count);
    }

    pub fn state(&self, slot: usize, age: usize) -> f64 {
        self.states.get(slot, age)
    }

    pub fn set_state(&mut self, slot: usize, value: f64, age: usize) {
        self.states.set(slot, value, age);
    }

    /// Set every time level of `slot`, e.g. from the DC operating point.
    pub fn fill_state(&mut self, slot: usize, value: f64) {
        self.states.fill(slot, value);
    }

    /// Rotate the state variables after an accepted time step.
    pub fn next_state(&mut self) {
        self.states.next();
    }

    pub fn states(&self) -> &StateVars {
        &self.states
    }

    /// Integrate state slot `qstate` for capacitance (or inductance) `cap`.
    ///
    /// The integrator leaves the total current (or voltage) in `qstate + 1`.
    pub fn integrate(&mut self, integrator: &dyn Integrator, qstate: usize, cap: f64) -> Companion {
        integrator.integrate(&mut self.states, qstate, cap)
    }

    // ---- Diagnostics ----

    pub fn operating_points(&self) -> &ValueMap {
        &self.operating_points
    }

    pub fn operating_points_mut(&mut self) -> &mut ValueMap {
        &mut self.operating_points
    }

    pub fn operating_point(&self, name: &str) -> f64 {
        self.operating_points.get(name)
    }

    pub fn set_operating_point(&mut self, name: &str, value: f64) {
        self.operating_points.set(name, value);
    }

    pub fn characteristics(&self) -> &ValueMap {
        &self.characteristics
    }

    pub fn characteristics_mut(&mut self) -> &mut ValueMap {
        &mut self.characteristics
    }

    pub fn characteristic(&self, name: &str) -> f64 {
        self.characteristics.get(name)
    }

    pub fn set_characteristic(&mut self, name: &str, value: f64) {
        self.characteristics.set(name, value);
    }

    // ---- History ----

    /// Create one history per port and per branch, each bounded by `age`.
    ///
    /// Each history starts on its own empty grid. Call
    /// [`apply_history`](Self::apply_history) with the driver's time logger
    /// before saving values; until then nothing is pruned and lookups see no
    /// samples.
    pub fn init_history(&mut self, age: f64) {
        let count = self.size + self.vsources;
        self.history_age = age;
        self.histories = (0..count)
            .map(|_| History::new(HistoryParams::with_age(age)))
            .collect();
        debug!("{}: {} histories, age {}", self.name, count, age);
    }

    /// Check whether histories were initialized.
    pub fn has_history(&self) -> bool {
        !self.histories.is_empty()
    }

    pub fn history_age(&self) -> f64 {
        self.history_age
    }

    /// Change the age bound of every history.
    pub fn set_history_age(&mut self, age: f64) {
        self.history_age = age;
        for h in &mut self.histories {
            h.set_age(age);
        }
    }

    /// History of slot `slot`: ports first, then branches.
    pub fn history(&self, slot: usize) -> Result<&History> {
        self.histories.get(slot).ok_or(Error::NoHistory {
            slot,
            count: self.histories.len(),
        })
    }

    /// Adopt the time grid of `timebase` for every history.
    pub fn apply_history(&mut self, timebase: &History) {
        for h in &mut self.histories {
            h.apply(timebase);
        }
    }

    /// Drop every value newer than `tcut`.
    pub fn truncate_history(&mut self, tcut: f64) {
        for h in &mut self.histories {
            h.truncate(tcut);
        }
    }

    /// Append a value to slot `slot`.
    pub fn append_history(&mut self, slot: usize, value: f64) {
        self.histories[slot].push_back(value);
    }

    /// Record the present port voltages and branch currents.
    pub fn save_history(&mut self) {
        for port in 0..self.size {
            let v = self.mna.v[port].re;
            self.append_history(port, v);
        }
        for branch in 0..self.vsources {
            let j = self.mna.j[branch].re;
            self.append_history(self.size + branch, j);
        }
    }

    /// Release every history.
    pub fn delete_history(&mut self) {
        self.histories.clear();
    }

    fn history_value(&self, slot: usize, t: f64) -> f64 {
        self.histories.get(slot).map_or(0.0, |h| h.nearest(t, true))
    }

    fn history_value_at(&self, slot: usize, idx: usize) -> f64 {
        self.histories.get(slot).map_or(0.0, |h| h.value_at(idx))
    }

    /// Voltage of port `port` at past time `t`.
    pub fn get_v_past(&self, port: usize, t: f64) -> f64 {
        self.history_value(port, t)
    }

    /// Voltage of port `port` at logical history index `idx`.
    pub fn get_v_at(&self, port: usize, idx: usize) -> f64 {
        self.history_value_at(port, idx)
    }

    /// Current of branch `branch` at past time `t`.
    pub fn get_j_past(&self, branch: usize, t: f64) -> f64 {
        self.history_value(self.size + branch, t)
    }

    /// Current of branch `branch` at logical history index `idx`.
    pub fn get_j_at(&self, branch: usize, idx: usize) -> f64 {
        self.history_value_at(self.size + branch, idx)
    }

    /// Time at logical history index `idx`.
    pub fn history_time_at(&self, idx: usize) -> f64 {
        self.histories.first().map_or(0.0, |h| h.time_at(idx))
    }

    /// Number of retained history samples.
    pub fn history_len(&self) -> usize {
        self.histories.first().map_or(0, History::len)
    }
}

fn check_shape(
    matrix: &'static str,
    expected: (usize, usize),
    m: &DMatrix<Complex64>,
) -> Result<()> {
    if m.shape() != expected {
        return Err(Error::DimensionMismatch {
            matrix,
            expected,
            actual: m.shape(),
        });
    }
    Ok(())
}
