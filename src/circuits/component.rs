use num_complex::Complex;

use crate::math::{cpe_term, j_omega, CScalar, Scalar};

/// Trait implemented by the lumped elements that appear in the catalogue circuits.
pub trait Component {
    /// Returns the element's impedance for an angular frequency `omega` (rad/s).
    fn impedance(&self, omega: Scalar) -> CScalar;
}

/// Ideal resistor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resistor {
    /// Resistance in ohms.
    pub resistance: Scalar,
}

impl Resistor {
    /// Creates a resistor.
    #[must_use]
    pub const fn new(resistance: Scalar) -> Self {
        Self { resistance }
    }
}

impl Component for Resistor {
    fn impedance(&self, _omega: Scalar) -> CScalar {
        Complex::new(self.resistance, 0.0)
    }
}

/// Ideal capacitor, `Z = 1/(C·jω)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacitor {
    /// Capacitance in farads.
    pub capacitance: Scalar,
}

impl Capacitor {
    /// Creates a capacitor.
    #[must_use]
    pub const fn new(capacitance: Scalar) -> Self {
        Self { capacitance }
    }
}

impl Component for Capacitor {
    fn impedance(&self, omega: Scalar) -> CScalar {
        1.0 / (self.capacitance * j_omega(omega))
    }
}

/// Constant phase element, `Z = 1/(Q·(jω)^α)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPhaseElement {
    /// Coefficient `Q` in s^(α-1)/ohm.
    pub q: Scalar,
    /// Exponent `α`, usually in `[0, 1]`.
    pub alpha: Scalar,
}

impl ConstantPhaseElement {
    /// Creates a constant phase element.
    #[must_use]
    pub const fn new(q: Scalar, alpha: Scalar) -> Self {
        Self { q, alpha }
    }

    /// Admittance-like term `Q·(jω)^α`.
    #[must_use]
    pub fn admittance(&self, omega: Scalar) -> CScalar {
        self.q * cpe_term(omega, self.alpha)
    }
}

impl Component for ConstantPhaseElement {
    fn impedance(&self, omega: Scalar) -> CScalar {
        1.0 / self.admittance(omega)
    }
}

/// Semi-infinite Warburg element, `Z = σ·ω^-0.5 − j·σ·ω^-0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Warburg {
    /// Warburg coefficient `σ` in ohm·s^-0.5.
    pub sigma: Scalar,
}

impl Warburg {
    /// Creates a Warburg element.
    #[must_use]
    pub const fn new(sigma: Scalar) -> Self {
        Self { sigma }
    }
}

impl Component for Warburg {
    fn impedance(&self, omega: Scalar) -> CScalar {
        let k = self.sigma * omega.powf(-0.5);
        Complex::new(k, -k)
    }
}
