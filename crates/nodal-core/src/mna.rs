//! Per-element matrix storage for Modified Nodal Analysis (MNA).
//!
//! An element with `size` ports and `vsources` internal voltage sources
//! contributes the block system
//!
//! ```text
//! [ Y  B ] [ V ]   [ I ]
//! [ C  D ] [ J ] = [ E ]
//! ```
//!
//! where `Y` is `size×size`, `B` is `size×vsources`, `C` is
//! `vsources×size` and `D` is `vsources×vsources`. Rows and columns are
//! local port and branch indices; mapping them into the global system is
//! the solver's job.
//!
//! An empty (0×0 or length 0) buffer means "not allocated".

use log::debug;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// Complex zero.
pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Zero-fill `m` if it already has shape `rows×cols`, otherwise replace it.
///
/// Returns `true` if the buffer was reallocated.
pub fn realloc_matrix(m: &mut DMatrix<Complex64>, rows: usize, cols: usize) -> bool {
    if m.nrows() == rows && m.ncols() == cols {
        m.fill(ZERO);
        false
    } else {
        *m = DMatrix::from_element(rows, cols, ZERO);
        true
    }
}

/// Zero-fill `v` if it already has length `len`, otherwise replace it.
///
/// Returns `true` if the buffer was reallocated.
pub fn realloc_vector(v: &mut DVector<Complex64>, len: usize) -> bool {
    if v.len() == len {
        v.fill(ZERO);
        false
    } else {
        *v = DVector::from_element(len, ZERO);
        true
    }
}

/// An unallocated matrix.
pub fn empty_matrix() -> DMatrix<Complex64> {
    DMatrix::from_element(0, 0, ZERO)
}

/// An unallocated vector.
pub fn empty_vector() -> DVector<Complex64> {
    DVector::from_element(0, ZERO)
}

/// The extended MNA matrix set of one element.
#[derive(Debug, Clone)]
pub struct MnaMatrices {
    /// Conductance matrix (`size×size`).
    pub y: DMatrix<Complex64>,
    /// Port-to-branch coupling (`size×vsources`).
    pub b: DMatrix<Complex64>,
    /// Branch-to-port coupling (`vsources×size`).
    pub c: DMatrix<Complex64>,
    /// Branch self terms (`vsources×vsources`).
    pub d: DMatrix<Complex64>,
    /// Port current excitation (`size`).
    pub i: DVector<Complex64>,
    /// Port voltages written back by the solver (`size`).
    pub v: DVector<Complex64>,
    /// Branch voltage excitation (`vsources`).
    pub e: DVector<Complex64>,
    /// Branch currents written back by the solver (`vsources`).
    pub j: DVector<Complex64>,
}

impl Default for MnaMatrices {
    fn default() -> Self {
        Self {
            y: empty_matrix(),
            b: empty_matrix(),
            c: empty_matrix(),
            d: empty_matrix(),
            i: empty_vector(),
            v: empty_vector(),
            e: empty_vector(),
            j: empty_vector(),
        }
    }
}

impl MnaMatrices {
    /// Create an allocated, zeroed matrix set.
    pub fn new(size: usize, vsources: usize) -> Self {
        let mut mna = Self::default();
        mna.alloc(size, vsources);
        mna
    }

    /// Allocate (or zero in place) every buffer for the given dimensions.
    ///
    /// The branch blocks are released when `vsources` is zero.
    pub fn alloc(&mut self, size: usize, vsources: usize) {
        let mut grown = realloc_matrix(&mut self.y, size, size);
        grown |= realloc_vector(&mut self.i, size);
        grown |= realloc_vector(&mut self.v, size);

        if vsources > 0 {
            grown |= realloc_matrix(&mut self.b, size, vsources);
            grown |= realloc_matrix(&mut self.c, vsources, size);
            grown |= realloc_matrix(&mut self.d, vsources, vsources);
            grown |= realloc_vector(&mut self.e, vsources);
            grown |= realloc_vector(&mut self.j, vsources);
        } else {
            self.free_branches();
        }

        if grown {
            debug!("mna: allocated {}x{} with {} branches", size, size, vsources);
        }
    }

    /// Release every buffer.
    pub fn free(&mut self) {
        *self = Self::default();
    }

    fn free_branches(&mut self) {
        self.b = empty_matrix();
        self.c = empty_matrix();
        self.d = empty_matrix();
        self.e = empty_vector();
        self.j = empty_vector();
    }

    /// Check whether the port blocks are allocated.
    pub fn is_allocated(&self) -> bool {
        !self.y.is_empty()
    }

    /// Number of ports the buffers are sized for.
    pub fn size(&self) -> usize {
        self.y.nrows()
    }

    /// Number of branches the buffers are sized for.
    pub fn num_vsources(&self) -> usize {
        self.d.nrows()
    }

    /// Zero every allocated entry without changing dimensions.
    pub fn clear(&mut self) {
        for m in [&mut self.y, &mut self.b, &mut self.c, &mut self.d] {
            m.fill(ZERO);
        }
        for v in [&mut self.i, &mut self.v, &mut self.e, &mut self.j] {
            v.fill(ZERO);
        }
    }

    /// Zero the stamped coefficients and excitations, keeping the solution
    /// vectors `V` and `J`.
    pub fn clear_stamps(&mut self) {
        for m in [&mut self.y, &mut self.b, &mut self.c, &mut self.d] {
            m.fill(ZERO);
        }
        self.i.fill(ZERO);
        self.e.fill(ZERO);
    }

    /// Stamp an ideal voltage source on branch `n`.
    ///
    /// Enforces `V(pos) - V(neg) = value` with the branch current flowing
    /// from `pos` through the source to `neg`:
    /// - `C[n, pos] = +1`, `C[n, neg] = -1`
    /// - `B[pos, n] = +1`, `B[neg, n] = -1`
    /// - `D[n, n] = 0`, `E[n] = value`
    pub fn stamp_voltage_source(&mut self, n: usize, pos: usize, neg: usize, value: Complex64) {
        self.c[(n, pos)] = Complex64::new(1.0, 0.0);
        self.c[(n, neg)] = Complex64::new(-1.0, 0.0);
        self.b[(pos, n)] = Complex64::new(1.0, 0.0);
        self.b[(neg, n)] = Complex64::new(-1.0, 0.0);
        self.d[(n, n)] = ZERO;
        self.e[n] = value;
    }

    /// Assemble the local block system `[Y B; C D]` and its right-hand side
    /// `[I; E]`.
    pub fn assemble(&self) -> (DMatrix<Complex64>, DVector<Complex64>) {
        let size = self.size();
        let vs = self.num_vsources();
        let dim = size + vs;

        let mut a = DMatrix::from_element(dim, dim, ZERO);
        let mut z = DVector::from_element(dim, ZERO);
        a.view_mut((0, 0), (size, size)).copy_from(&self.y);
        z.rows_mut(0, size).copy_from(&self.i);
        if vs > 0 {
            a.view_mut((0, size), (size, vs)).copy_from(&self.b);
            a.view_mut((size, 0), (vs, size)).copy_from(&self.c);
            a.view_mut((size, size), (vs, vs)).copy_from(&self.d);
            z.rows_mut(size, vs).copy_from(&self.e);
        }
        (a, z)
    }
}

/// Harmonic-balance charge and conductance buffers.
#[derive(Debug, Clone)]
pub struct HbBuffers {
    /// Charges (`size`).
    pub q: DVector<Complex64>,
    /// Charge derivatives with respect to port voltages (`size×size`).
    pub qv: DMatrix<Complex64>,
    /// Capacitive current contributions (`size`).
    pub cv: DVector<Complex64>,
    /// Conductive current contributions (`size`).
    pub gv: DVector<Complex64>,
}

impl Default for HbBuffers {
    fn default() -> Self {
        Self {
            q: empty_vector(),
            qv: empty_matrix(),
            cv: empty_vector(),
            gv: empty_vector(),
        }
    }
}

impl HbBuffers {
    /// Allocate (or zero in place) for `size` ports.
    pub fn alloc(&mut self, size: usize) {
        realloc_vector(&mut self.q, size);
        realloc_matrix(&mut self.qv, size, size);
        realloc_vector(&mut self.cv, size);
        realloc_vector(&mut self.gv, size);
    }

    /// Release every buffer.
    pub fn free(&mut self) {
        *self = Self::default();
    }

    /// Check whether the buffers are allocated.
    pub fn is_allocated(&self) -> bool {
        !self.qv.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_new_dimensions() {
        let mna = MnaMatrices::new(3, 2);
        assert_eq!(mna.y.shape(), (3, 3));
        assert_eq!(mna.b.shape(), (3, 2));
        assert_eq!(mna.c.shape(), (2, 3));
        assert_eq!(mna.d.shape(), (2, 2));
        assert_eq!(mna.i.len(), 3);
        assert_eq!(mna.v.len(), 3);
        assert_eq!(mna.e.len(), 2);
        assert_eq!(mna.j.len(), 2);
    }

    #[test]
    fn test_no_branches_leaves_branch_blocks_empty() {
        let mna = MnaMatrices::new(2, 0);
        assert!(mna.is_allocated());
        assert!(mna.b.is_empty());
        assert!(mna.d.is_empty());
        assert!(mna.e.is_empty());
        assert_eq!(mna.num_vsources(), 0);
    }

    #[test]
    fn test_alloc_same_shape_zeroes_in_place() {
        let mut mna = MnaMatrices::new(2, 1);
        mna.y[(0, 1)] = c(3.0);
        mna.e[0] = c(5.0);

        mna.alloc(2, 1);
        assert_eq!(mna.y.shape(), (2, 2));
        assert!(mna.y.iter().all(|z| *z == ZERO));
        assert_eq!(mna.e[0], ZERO);
    }

    #[test]
    fn test_alloc_new_shape_reallocates() {
        let mut mna = MnaMatrices::new(2, 1);
        mna.alloc(4, 0);
        assert_eq!(mna.y.shape(), (4, 4));
        assert!(mna.b.is_empty());
    }

    #[test]
    fn test_free() {
        let mut mna = MnaMatrices::new(2, 1);
        mna.free();
        assert!(!mna.is_allocated());
        assert_eq!(mna.size(), 0);
    }

    #[test]
    fn test_clear_keeps_solution() {
        let mut mna = MnaMatrices::new(2, 1);
        mna.y[(0, 0)] = c(1.0);
        mna.e[0] = c(2.0);
        mna.v[1] = c(3.0);
        mna.j[0] = c(4.0);

        mna.clear_stamps();
        assert_eq!(mna.y[(0, 0)], ZERO);
        assert_eq!(mna.e[0], ZERO);
        assert_eq!(mna.v[1], c(3.0));
        assert_eq!(mna.j[0], c(4.0));

        mna.clear();
        assert_eq!(mna.v[1], ZERO);
        assert_eq!(mna.y.shape(), (2, 2));
    }

    #[test]
    fn test_stamp_voltage_source() {
        let mut mna = MnaMatrices::new(2, 1);
        mna.stamp_voltage_source(0, 0, 1, c(5.0));

        assert_eq!(mna.b[(0, 0)], c(1.0));
        assert_eq!(mna.b[(1, 0)], c(-1.0));
        assert_eq!(mna.c[(0, 0)], c(1.0));
        assert_eq!(mna.c[(0, 1)], c(-1.0));
        assert_eq!(mna.d[(0, 0)], ZERO);
        assert_eq!(mna.e[0], c(5.0));
    }

    #[test]
    fn test_assemble_layout() {
        let mut mna = MnaMatrices::new(2, 1);
        mna.y[(1, 1)] = c(2.0);
        mna.i[1] = c(0.5);
        mna.stamp_voltage_source(0, 0, 1, c(5.0));

        let (a, z) = mna.assemble();
        assert_eq!(a.shape(), (3, 3));
        assert_eq!(a[(1, 1)], c(2.0));
        assert_eq!(a[(0, 2)], c(1.0));
        assert_eq!(a[(2, 1)], c(-1.0));
        assert_eq!(z[1], c(0.5));
        assert_eq!(z[2], c(5.0));
    }

    #[test]
    fn test_hb_buffers() {
        let mut hb = HbBuffers::default();
        assert!(!hb.is_allocated());
        hb.alloc(3);
        assert_eq!(hb.qv.shape(), (3, 3));
        assert_eq!(hb.q.len(), 3);
        assert_eq!(hb.cv.len(), 3);
        assert_eq!(hb.gv.len(), 3);
        hb.free();
        assert!(!hb.is_allocated());
    }
}
