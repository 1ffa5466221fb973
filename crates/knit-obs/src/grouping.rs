use std::collections::BTreeSet;

use knit_core::errors::KnitError;
use tracing::debug;

use crate::group::{CommutingObservableGroup, ObservableCollection};
use crate::pauli::PauliList;

/// Partitions observables into groups measurable with one local setting.
pub trait ObservableGrouper: Send + Sync {
    /// Returns the groups in a deterministic order.
    fn group(&self, observables: &PauliList) -> Result<Vec<CommutingObservableGroup>, KnitError>;

    /// Groups `observables` and indexes the result.
    fn collect(&self, observables: &PauliList) -> Result<ObservableCollection, KnitError> {
        Ok(ObservableCollection::from_groups(self.group(observables)?))
    }
}

/// First-fit grouping by qubit-wise commutation.
///
/// Duplicates are dropped, then each observable joins the first group whose
/// general observable it commutes with qubit-wise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QubitWiseGrouper;

impl ObservableGrouper for QubitWiseGrouper {
    fn group(&self, observables: &PauliList) -> Result<Vec<CommutingObservableGroup>, KnitError> {
        let mut seen = BTreeSet::new();
        let mut groups: Vec<CommutingObservableGroup> = Vec::new();
        for pauli in observables {
            if !seen.insert(pauli) {
                continue;
            }
            if groups.iter_mut().any(|group| group.try_push(pauli)) {
                continue;
            }
            groups.push(CommutingObservableGroup::new(vec![pauli.clone()])?);
        }
        debug!(
            observables = observables.len(),
            unique = seen.len(),
            groups = groups.len(),
            "grouped observables"
        );
        Ok(groups)
    }
}
