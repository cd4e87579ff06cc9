//! Stamp helpers shared by the two-terminal devices.

use nodal_core::Element;
use num_complex::Complex64;

/// Reference impedance for S-parameters (Ohms).
pub const Z0: f64 = 50.0;

/// Standard temperature for noise normalization (K).
pub const T0: f64 = 290.0;

/// Default device temperature (K).
pub const DEFAULT_TEMP: f64 = 300.0;

/// Local port of the positive terminal.
pub const POS: usize = 0;

/// Local port of the negative terminal.
pub const NEG: usize = 1;

/// S-parameters of a series impedance `z` between two ports.
///
/// `z` is normalized to [`Z0`].
pub fn series_sparams(e: &mut Element, z: Complex64) {
    let d = z + 2.0;
    let s11 = z / d;
    let s21 = Complex64::new(2.0, 0.0) / d;
    e.set_s(POS, POS, s11);
    e.set_s(NEG, NEG, s11);
    e.set_s(POS, NEG, s21);
    e.set_s(NEG, POS, s21);
}

/// S-parameters of an open circuit between two ports.
pub fn open_sparams(e: &mut Element) {
    e.set_s(POS, POS, 1.0);
    e.set_s(NEG, NEG, 1.0);
    e.set_s(POS, NEG, 0.0);
    e.set_s(NEG, POS, 0.0);
}

/// Thermal noise correlation of a real conductance `g` at `temp` kelvin,
/// normalized to `k * T0`.
pub fn thermal_noise(e: &mut Element, g: f64, temp: f64) {
    let f = temp / T0 * 4.0 * g;
    e.set_n(POS, POS, f);
    e.set_n(NEG, NEG, f);
    e.set_n(POS, NEG, -f);
    e.set_n(NEG, POS, -f);
}

/// Branch voltage of a two-terminal element from its solved port voltages.
pub fn branch_voltage(e: &Element) -> f64 {
    (e.get_v(POS) - e.get_v(NEG)).re
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_sparams_limits() {
        let mut e = Element::with_size("X", 2, 0);
        series_sparams(&mut e, Complex64::new(0.0, 0.0));
        assert_eq!(e.get_s(0, 0).re, 0.0);
        assert_eq!(e.get_s(1, 0).re, 1.0);

        // A matched shunt-free series resistor of 2*Z0.
        series_sparams(&mut e, Complex64::new(2.0, 0.0));
        assert!((e.get_s(0, 0).re - 0.5).abs() < 1e-15);
        assert!((e.get_s(0, 1).re - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_thermal_noise_pattern() {
        let mut e = Element::with_size("R", 2, 0);
        thermal_noise(&mut e, 1e-3, T0);
        assert!((e.get_n(0, 0).re - 4e-3).abs() < 1e-15);
        assert!((e.get_n(0, 1).re + 4e-3).abs() < 1e-15);
    }
}
