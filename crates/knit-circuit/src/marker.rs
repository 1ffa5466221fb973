use std::sync::Arc;

use knit_core::errors::{ErrorInfo, KnitError};
use knit_core::CutId;
use serde::{Deserialize, Serialize};

use crate::basis::QpdBasis;

/// Placement of a cut marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerKind {
    /// The marker still spans both parties of the cut.
    TwoParty,
    /// One side of a separated cut; its companion lives in another partition.
    OneParty {
        /// Which party of the basis maps this marker applies.
        party: usize,
        /// Identity shared with the companion marker(s) of the same cut.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cut_id: Option<CutId>,
    },
}

/// Placeholder operation standing in for a decomposed interaction.
///
/// Markers that belong to the same cut share one `Arc<QpdBasis>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SerializableMarker", into = "SerializableMarker")]
pub struct CutMarker {
    basis: Arc<QpdBasis>,
    kind: MarkerKind,
    label: Option<String>,
}

impl CutMarker {
    /// Creates a marker acting on both parties of a two-party basis.
    pub fn two_party(basis: Arc<QpdBasis>) -> Result<Self, KnitError> {
        if basis.num_parties() != 2 {
            return Err(KnitError::Circuit(
                ErrorInfo::new(
                    "marker-basis-mismatch",
                    "two-party markers need a basis acting on two parties",
                )
                .with_context("parties", basis.num_parties()),
            ));
        }
        Ok(Self {
            basis,
            kind: MarkerKind::TwoParty,
            label: None,
        })
    }

    /// Creates a marker for one party of a separated cut.
    pub fn one_party(
        basis: Arc<QpdBasis>,
        party: usize,
        cut_id: Option<CutId>,
    ) -> Result<Self, KnitError> {
        if party >= basis.num_parties() {
            return Err(KnitError::Circuit(
                ErrorInfo::new("party-out-of-range", "basis has no such party")
                    .with_context("party", party)
                    .with_context("parties", basis.num_parties()),
            ));
        }
        Ok(Self {
            basis,
            kind: MarkerKind::OneParty { party, cut_id },
            label: None,
        })
    }

    /// Attaches a display label to the marker.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Basis shared by every marker of this cut.
    pub fn basis(&self) -> &Arc<QpdBasis> {
        &self.basis
    }

    /// Placement of the marker.
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// Optional display label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Number of qubits the marker occupies in a circuit.
    pub fn num_qubits(&self) -> usize {
        match self.kind {
            MarkerKind::TwoParty => 2,
            MarkerKind::OneParty { .. } => 1,
        }
    }
}

/// Wire form of a [`CutMarker`]; loading goes through the checked constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableMarker {
    basis: Arc<QpdBasis>,
    kind: MarkerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl TryFrom<SerializableMarker> for CutMarker {
    type Error = KnitError;

    fn try_from(value: SerializableMarker) -> Result<Self, Self::Error> {
        let marker = match value.kind {
            MarkerKind::TwoParty => CutMarker::two_party(value.basis)?,
            MarkerKind::OneParty { party, cut_id } => {
                CutMarker::one_party(value.basis, party, cut_id)?
            }
        };
        Ok(Self {
            label: value.label,
            ..marker
        })
    }
}

impl From<CutMarker> for SerializableMarker {
    fn from(value: CutMarker) -> Self {
        Self {
            basis: value.basis,
            kind: value.kind,
            label: value.label,
        }
    }
}
