#![deny(missing_docs)]
#![doc = "Pauli observables and qubit-wise commuting measurement groups for knit experiments."]

/// Measurement groups and observable lookup.
pub mod group;
/// Observable grouping strategies.
pub mod grouping;
/// Pauli strings and observable lists.
pub mod pauli;

pub use group::{CommutingObservableGroup, ObservableCollection, ObservableLocation};
pub use grouping::{ObservableGrouper, QubitWiseGrouper};
pub use pauli::{Pauli, PauliList};
