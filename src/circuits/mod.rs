//! Equivalent-circuit catalogue and impedance evaluators.

/// Lumped element impedances.
pub mod component;
/// Named element values and validated circuit specifications.
pub mod elements;
/// Closed-form evaluators, one per topology.
pub mod evaluate;
/// Topology catalogue.
pub mod topology;

pub use component::{Capacitor, Component, ConstantPhaseElement, Resistor, Warburg};
pub use elements::{CircuitElements, CircuitSpec, ElementKind};
pub use evaluate::{evaluate, evaluator, Evaluator};
pub use topology::Topology;
