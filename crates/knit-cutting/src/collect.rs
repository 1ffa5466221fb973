use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use knit_circuit::{Circuit, CutMarker, MarkerKind, QpdBasis};
use knit_core::errors::{ErrorInfo, KnitError};
use knit_core::CutId;

const CUT_IDENTITY_HINT: &str = "every one-party marker of cut N must carry the identity N, either \
     as its cut id or as a label of the form \"<text>_N\", so that the markers of one cut are \
     sampled jointly";

fn cutting_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

/// Cut markers of a single unseparated circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedCuts {
    /// One basis per two-party marker, in program order.
    pub bases: Vec<Arc<QpdBasis>>,
    /// Instruction index of each marker, aligned with `bases`.
    pub positions: Vec<Vec<usize>>,
}

/// Cut markers of one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionCuts {
    /// One position group per marker, in program order.
    pub positions: Vec<Vec<usize>>,
    /// For each position group, the joint choice slot of its cut.
    pub slots: Vec<usize>,
}

/// Cut markers of a dictionary of partitions, correlated by cut identity.
#[derive(Debug, Clone)]
pub struct PartitionedCuts<L> {
    /// One basis per distinct cut identity, in ascending identity order.
    pub bases: Vec<Arc<QpdBasis>>,
    /// Distinct identities, aligned with `bases`.
    pub cut_ids: Vec<CutId>,
    /// Per-partition positions and slots, in caller order.
    pub partitions: IndexMap<L, PartitionCuts>,
}

/// Identity of a one-party marker: its typed id, else its label suffix.
pub fn marker_cut_id(marker: &CutMarker) -> Option<CutId> {
    match marker.kind() {
        MarkerKind::OneParty {
            cut_id: Some(id), ..
        } => Some(id),
        _ => marker.label().and_then(CutId::from_label_suffix),
    }
}

/// Collects the bases of an unseparated circuit, one per two-party marker.
pub fn collect_unified(circuit: &Circuit) -> Result<UnifiedCuts, KnitError> {
    let mut bases = Vec::new();
    let mut positions = Vec::new();
    for (idx, marker) in circuit.cut_markers() {
        match marker.kind() {
            MarkerKind::TwoParty => {
                bases.push(Arc::clone(marker.basis()));
                positions.push(vec![idx]);
            }
            MarkerKind::OneParty { .. } => {
                return Err(KnitError::Cutting(
                    cutting_error(
                        "unsupported-marker-placement",
                        "one-party cut markers are not supported on an unseparated circuit",
                    )
                    .with_context("position", idx)
                    .with_hint("pass the separated subcircuits keyed by partition label"),
                ))
            }
        }
    }
    Ok(UnifiedCuts { bases, positions })
}

/// Collects one-party markers across partitions and orders their cuts by identity.
pub fn collect_partitioned<L>(
    circuits: &IndexMap<L, Circuit>,
) -> Result<PartitionedCuts<L>, KnitError>
where
    L: Clone + Eq + Hash + Debug,
{
    let mut bases_by_id: BTreeMap<CutId, Arc<QpdBasis>> = BTreeMap::new();
    let mut markers_by_partition = Vec::with_capacity(circuits.len());
    for (label, circuit) in circuits {
        let mut positions = Vec::new();
        let mut ids = Vec::new();
        for (idx, marker) in circuit.cut_markers() {
            if marker.kind() == MarkerKind::TwoParty {
                return Err(KnitError::Cutting(
                    cutting_error(
                        "unsupported-marker-placement",
                        "two-party cut markers must be separated before partitioned cutting",
                    )
                    .with_context("partition", format!("{label:?}"))
                    .with_context("position", idx),
                ));
            }
            let id = marker_cut_id(marker).ok_or_else(|| {
                let mut info = cutting_error(
                    "malformed-cut-identity",
                    "one-party cut marker has no integer cut identity",
                )
                .with_context("partition", format!("{label:?}"))
                .with_context("position", idx)
                .with_hint(CUT_IDENTITY_HINT);
                if let Some(text) = marker.label() {
                    info = info.with_context("label", text);
                }
                KnitError::Cutting(info)
            })?;
            match bases_by_id.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(marker.basis()));
                }
                Entry::Occupied(slot) => {
                    let known = slot.get();
                    if !Arc::ptr_eq(known, marker.basis()) && known != marker.basis() {
                        return Err(KnitError::Cutting(
                            cutting_error(
                                "inconsistent-cut-basis",
                                "markers sharing a cut identity carry different bases",
                            )
                            .with_context("cut_id", id)
                            .with_context("partition", format!("{label:?}"))
                            .with_context("position", idx),
                        ));
                    }
                }
            }
            positions.push(vec![idx]);
            ids.push(id);
        }
        markers_by_partition.push((label.clone(), positions, ids));
    }

    let cut_ids: Vec<CutId> = bases_by_id.keys().copied().collect();
    let bases = bases_by_id.into_values().collect();
    let partitions = markers_by_partition
        .into_iter()
        .map(|(label, positions, ids)| {
            let slots = ids
                .iter()
                .map(|id| cut_ids.partition_point(|known| known < id))
                .collect();
            (label, PartitionCuts { positions, slots })
        })
        .collect();
    Ok(PartitionedCuts {
        bases,
        cut_ids,
        partitions,
    })
}
