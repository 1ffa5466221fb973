use std::collections::BTreeMap;

use knit_core::errors::{ErrorInfo, KnitError};
use serde::{Deserialize, Serialize};

use crate::pauli::{Pauli, PauliList};

/// Observables that can be estimated from one local measurement setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerializableGroup", into = "SerializableGroup")]
pub struct CommutingObservableGroup {
    general_observable: Pauli,
    commuting_observables: Vec<Pauli>,
    pauli_indices: Vec<usize>,
}

impl CommutingObservableGroup {
    /// Builds a group from pairwise qubit-wise commuting observables.
    pub fn new(commuting_observables: Vec<Pauli>) -> Result<Self, KnitError> {
        let list = PauliList::new(commuting_observables)?;
        let mut general_observable = Pauli::identity(list.num_qubits());
        for (idx, pauli) in list.iter().enumerate() {
            if !general_observable.qubitwise_commutes(pauli) {
                return Err(KnitError::Observable(
                    ErrorInfo::new(
                        "non-commuting-group",
                        "group members must commute qubit-wise",
                    )
                    .with_context("index", idx)
                    .with_context("observable", pauli),
                ));
            }
            general_observable.absorb(pauli);
        }
        let pauli_indices = general_observable.support();
        Ok(Self {
            general_observable,
            commuting_observables: list.into(),
            pauli_indices,
        })
    }

    /// Union of the members' X and Z components.
    pub fn general_observable(&self) -> &Pauli {
        &self.general_observable
    }

    /// Members in insertion order.
    pub fn commuting_observables(&self) -> &[Pauli] {
        &self.commuting_observables
    }

    /// Measured (non-identity) qubits in ascending order.
    pub fn pauli_indices(&self) -> &[usize] {
        &self.pauli_indices
    }

    /// Number of qubits the group acts on.
    pub fn num_qubits(&self) -> usize {
        self.general_observable.num_qubits()
    }

    pub(crate) fn try_push(&mut self, pauli: &Pauli) -> bool {
        if !self.general_observable.qubitwise_commutes(pauli) {
            return false;
        }
        self.general_observable.absorb(pauli);
        self.commuting_observables.push(pauli.clone());
        self.pauli_indices = self.general_observable.support();
        true
    }
}

/// Wire form of a [`CommutingObservableGroup`]; derived fields are rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableGroup {
    commuting_observables: Vec<Pauli>,
}

impl TryFrom<SerializableGroup> for CommutingObservableGroup {
    type Error = KnitError;

    fn try_from(value: SerializableGroup) -> Result<Self, Self::Error> {
        CommutingObservableGroup::new(value.commuting_observables)
    }
}

impl From<CommutingObservableGroup> for SerializableGroup {
    fn from(value: CommutingObservableGroup) -> Self {
        Self {
            commuting_observables: value.commuting_observables,
        }
    }
}

/// Position of an observable inside an [`ObservableCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObservableLocation {
    /// Index of the group.
    pub group: usize,
    /// Index of the observable within the group.
    pub index: usize,
}

/// Measurement groups plus a lookup from each observable to its locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableCollection {
    groups: Vec<CommutingObservableGroup>,
    lookup: BTreeMap<Pauli, Vec<ObservableLocation>>,
}

impl ObservableCollection {
    /// Indexes the given groups.
    pub fn from_groups(groups: Vec<CommutingObservableGroup>) -> Self {
        let mut lookup: BTreeMap<Pauli, Vec<ObservableLocation>> = BTreeMap::new();
        for (group_idx, group) in groups.iter().enumerate() {
            for (index, pauli) in group.commuting_observables().iter().enumerate() {
                lookup.entry(pauli.clone()).or_default().push(ObservableLocation {
                    group: group_idx,
                    index,
                });
            }
        }
        Self { groups, lookup }
    }

    /// Measurement groups in grouper order.
    pub fn groups(&self) -> &[CommutingObservableGroup] {
        &self.groups
    }

    /// Every location of `pauli`, empty if it was not grouped.
    pub fn locations(&self, pauli: &Pauli) -> &[ObservableLocation] {
        self.lookup.get(pauli).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Full observable lookup table.
    pub fn lookup(&self) -> &BTreeMap<Pauli, Vec<ObservableLocation>> {
        &self.lookup
    }

    /// Consumes the collection, returning its groups.
    pub fn into_groups(self) -> Vec<CommutingObservableGroup> {
        self.groups
    }
}
