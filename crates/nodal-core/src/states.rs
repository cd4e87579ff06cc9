//! Per-element state variables for time integration.
//!
//! Each slot keeps the current value and the previous `STATE_DEPTH - 1`
//! accepted values. Age 0 is the value at the time point being solved,
//! age 1 the last accepted one, and so on.

/// Number of time levels kept per slot.
pub const STATE_DEPTH: usize = 8;

/// Ring buffers of state values, one per slot, rotated together.
#[derive(Debug, Clone, Default)]
pub struct StateVars {
    values: Vec<[f64; STATE_DEPTH]>,
    /// Ring position of age 0.
    head: usize,
}

impl StateVars {
    /// Create `count` zeroed slots.
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![[0.0; STATE_DEPTH]; count],
            head: 0,
        }
    }

    /// Discard all values and resize to `count` zeroed slots.
    pub fn init(&mut self, count: usize) {
        *self = Self::new(count);
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn pos(&self, age: usize) -> usize {
        (self.head + age) % STATE_DEPTH
    }

    /// Get the value of `slot` `age` accepted steps ago.
    pub fn get(&self, slot: usize, age: usize) -> f64 {
        self.values[slot][self.pos(age)]
    }

    /// Set the value of `slot` `age` accepted steps ago.
    pub fn set(&mut self, slot: usize, value: f64, age: usize) {
        let p = self.pos(age);
        self.values[slot][p] = value;
    }

    /// Set every time level of `slot` to `value`.
    pub fn fill(&mut self, slot: usize, value: f64) {
        self.values[slot] = [value; STATE_DEPTH];
    }

    /// Accept the current time point: every age shifts by one and the new
    /// age-0 value starts as a copy of the one just accepted.
    pub fn next(&mut self) {
        self.head = (self.head + STATE_DEPTH - 1) % STATE_DEPTH;
        let (cur, prev) = (self.pos(0), self.pos(1));
        for ring in &mut self.values {
            ring[cur] = ring[prev];
        }
    }
}
