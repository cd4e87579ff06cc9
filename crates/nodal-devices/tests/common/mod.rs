//! A minimal analysis driver for integration tests.
//!
//! Maps element ports onto global nodes (`None` is ground), assembles every
//! element's MNA block into one dense complex system and writes the
//! solution back into each element's `V` and `J`.

#![allow(dead_code)]

use nalgebra::{DMatrix, DVector};
use nodal_core::{Device, History, IntegrationMethod, StepIntegrator};
use num_complex::Complex64;

struct Entry {
    device: Box<dyn Device>,
    nodes: Vec<Option<usize>>,
    branch_base: usize,
}

pub struct Circuit {
    num_nodes: usize,
    num_branches: usize,
    entries: Vec<Entry>,
    clock: History,
}

/// One accepted transient point.
pub struct TimePoint {
    pub time: f64,
    pub solution: DVector<f64>,
}

impl Circuit {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            num_branches: 0,
            entries: Vec::new(),
            clock: History::time_logger(),
        }
    }

    /// Add a device; returns its index.
    pub fn add(&mut self, device: impl Device + 'static, nodes: &[Option<usize>]) -> usize {
        let element = device.element();
        assert_eq!(element.size(), nodes.len(), "{}: port count", element.name());
        let branch_base = self.num_branches;
        self.num_branches += element.voltage_sources();
        self.entries.push(Entry {
            device: Box::new(device),
            nodes: nodes.to_vec(),
            branch_base,
        });
        self.entries.len() - 1
    }

    pub fn device(&self, idx: usize) -> &dyn Device {
        self.entries[idx].device.as_ref()
    }

    pub fn device_mut(&mut self, idx: usize) -> &mut dyn Device {
        self.entries[idx].device.as_mut()
    }

    /// Global row of branch `k` of entry `entry`.
    pub fn branch_row(&self, entry: usize, k: usize) -> usize {
        self.num_nodes + self.entries[entry].branch_base + k
    }

    fn dim(&self) -> usize {
        self.num_nodes + self.num_branches
    }

    fn assemble(&self) -> (DMatrix<Complex64>, DVector<Complex64>) {
        let n = self.dim();
        let mut a = DMatrix::from_element(n, n, Complex64::new(0.0, 0.0));
        let mut z = DVector::from_element(n, Complex64::new(0.0, 0.0));

        for entry in &self.entries {
            let e = entry.device.element();
            let mna = e.mna();
            let branch = |k: usize| self.num_nodes + entry.branch_base + k;
            let vs = e.voltage_sources();

            for (r, gr) in entry.nodes.iter().enumerate() {
                let Some(gr) = *gr else { continue };
                z[gr] += mna.i[r];
                for (c, gc) in entry.nodes.iter().enumerate() {
                    if let Some(gc) = *gc {
                        a[(gr, gc)] += mna.y[(r, c)];
                    }
                }
                for k in 0..vs {
                    a[(gr, branch(k))] += mna.b[(r, k)];
                    a[(branch(k), gr)] += mna.c[(k, r)];
                }
            }
            for k in 0..vs {
                z[branch(k)] += mna.e[k];
                for l in 0..vs {
                    a[(branch(k), branch(l))] += mna.d[(k, l)];
                }
            }
        }
        (a, z)
    }

    fn write_back(&mut self, x: &DVector<Complex64>) {
        let num_nodes = self.num_nodes;
        for entry in &mut self.entries {
            let nodes = entry.nodes.clone();
            let base = entry.branch_base;
            let e = entry.device.element_mut();
            for (port, node) in nodes.iter().enumerate() {
                let v = node.map_or(Complex64::new(0.0, 0.0), |n| x[n]);
                e.set_v(port, v);
            }
            for k in 0..e.voltage_sources() {
                e.set_j(k, x[num_nodes + base + k]);
            }
        }
    }

    fn solve(&mut self) -> DVector<Complex64> {
        let (a, z) = self.assemble();
        let x = a.lu().solve(&z).expect("circuit matrix should be regular");
        self.write_back(&x);
        x
    }

    /// DC operating point.
    pub fn dc(&mut self) -> DVector<f64> {
        for entry in &mut self.entries {
            entry.device.init_dc();
            entry.device.calc_dc();
        }
        let x = self.solve();
        for entry in &mut self.entries {
            entry.device.calc_operating_points();
        }
        x.map(|c| c.re)
    }

    /// Small-signal solution at `frequency`.
    pub fn ac(&mut self, frequency: f64) -> DVector<Complex64> {
        for entry in &mut self.entries {
            entry.device.init_ac();
            entry.device.calc_ac(frequency);
        }
        self.solve()
    }

    /// Fixed-step transient from the DC operating point.
    pub fn transient(&mut self, method: IntegrationMethod, h: f64, steps: usize) -> Vec<TimePoint> {
        let x0 = self.dc();
        let x0c = x0.map(|v| Complex64::new(v, 0.0));
        for entry in &mut self.entries {
            entry.device.init_tr();
        }
        self.write_back(&x0c);

        self.clock.clear();
        self.clock.push_back(0.0);
        for entry in &mut self.entries {
            let e = entry.device.element_mut();
            if e.has_history() {
                e.apply_history(&self.clock);
                e.save_history();
            }
        }

        let integ = StepIntegrator::new(method, h);
        let mut points = vec![TimePoint {
            time: 0.0,
            solution: x0,
        }];
        for k in 1..=steps {
            let t = k as f64 * h;
            for entry in &mut self.entries {
                entry.device.element_mut().next_state();
            }

            // Linear circuits: the second pass reproduces the first solution
            // and leaves the integrator state consistent with it.
            let mut x = DVector::zeros(0);
            for _ in 0..2 {
                for entry in &mut self.entries {
                    entry.device.calc_tr(t, &integ);
                }
                x = self.solve();
            }

            self.clock.push_back(t);
            for entry in &mut self.entries {
                let e = entry.device.element_mut();
                if e.has_history() {
                    e.save_history();
                }
            }
            points.push(TimePoint {
                time: t,
                solution: x.map(|c| c.re),
            });
        }
        points
    }
}
