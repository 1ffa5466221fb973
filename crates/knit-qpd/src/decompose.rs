use std::collections::BTreeMap;
use std::sync::Arc;

use knit_circuit::{Circuit, Clbit, CutMarker, LocalOp, MarkerKind};
use knit_core::errors::{ErrorInfo, KnitError};
use tracing::trace;

use crate::weights::JointChoice;

/// Name of the register that receives mid-circuit QPD measurement outcomes.
pub const QPD_MEASUREMENT_REGISTER: &str = "qpd_measurements";

fn resolve_error(code: &str, message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(code, message.into())
}

/// Replaces cut markers with the concrete operations of a joint choice.
pub trait CircuitResolver: Send + Sync {
    /// Resolves every marker of `circuit`.
    ///
    /// `positions[i]` lists the instruction indices of the markers that take
    /// alternative `choice[i]`.
    fn resolve(
        &self,
        circuit: &Circuit,
        positions: &[Vec<usize>],
        choice: &JointChoice,
    ) -> Result<Circuit, KnitError>;
}

/// Default resolver expanding markers into their basis maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QpdResolver;

impl CircuitResolver for QpdResolver {
    fn resolve(
        &self,
        circuit: &Circuit,
        positions: &[Vec<usize>],
        choice: &JointChoice,
    ) -> Result<Circuit, KnitError> {
        decompose_qpd_instructions(circuit, positions, choice)
    }
}

/// Returns a copy of `circuit` with every cut marker replaced by the chosen
/// alternative of its basis.
///
/// Two-party markers expand to the party-0 operations on their first qubit
/// followed by the party-1 operations on their second qubit. QPD measurements
/// write to consecutive bits of a new [`QPD_MEASUREMENT_REGISTER`] register,
/// which is only added when at least one measurement is emitted.
pub fn decompose_qpd_instructions(
    circuit: &Circuit,
    positions: &[Vec<usize>],
    choice: &JointChoice,
) -> Result<Circuit, KnitError> {
    let chosen = validate_positions(circuit, positions, choice)?;

    let mut num_measurements = 0;
    for (idx, inst) in circuit.instructions().iter().enumerate() {
        if let Some(marker) = inst.operation.as_cut() {
            let alternative = *chosen.get(&idx).ok_or_else(|| {
                KnitError::Qpd(
                    resolve_error(
                        "unresolved-cut-marker",
                        "cut marker is not addressed by any position",
                    )
                    .with_context("position", idx),
                )
            })?;
            num_measurements += party_ops(marker, alternative, &inst.qubits, idx)?
                .iter()
                .flat_map(|(_, ops)| ops.iter())
                .filter(|op| matches!(op, LocalOp::Measure))
                .count();
        }
    }

    let mut resolved = Circuit::new(circuit.num_qubits());
    for reg in circuit.cregs() {
        resolved.add_register(reg.name.clone(), reg.size)?;
    }
    let qpd_register = if num_measurements > 0 {
        Some(resolved.add_register(QPD_MEASUREMENT_REGISTER, num_measurements)?)
    } else {
        None
    };

    let mut next_bit = 0;
    for (idx, inst) in circuit.instructions().iter().enumerate() {
        let Some(marker) = inst.operation.as_cut() else {
            resolved.append(inst.operation.clone(), inst.qubits.clone(), inst.clbits.clone())?;
            continue;
        };
        let alternative = chosen[&idx];
        for (qubit, ops) in party_ops(marker, alternative, &inst.qubits, idx)? {
            for op in ops {
                match op {
                    LocalOp::Gate { gate } => resolved.gate(*gate, &[qubit])?,
                    LocalOp::Measure => {
                        // Counted above, so the register exists.
                        if let Some(register) = qpd_register {
                            resolved.measure(qubit, Clbit::new(register, next_bit))?;
                            next_bit += 1;
                        }
                    }
                }
            }
        }
    }
    trace!(
        markers = chosen.len(),
        qpd_measurements = num_measurements,
        "resolved cut markers"
    );
    Ok(resolved)
}

fn validate_positions(
    circuit: &Circuit,
    positions: &[Vec<usize>],
    choice: &JointChoice,
) -> Result<BTreeMap<usize, usize>, KnitError> {
    if positions.len() != choice.len() {
        return Err(KnitError::Qpd(
            resolve_error(
                "choice-length-mismatch",
                "joint choice must have one entry per position group",
            )
            .with_context("positions", positions.len())
            .with_context("choice", choice.len()),
        ));
    }
    let mut chosen = BTreeMap::new();
    for (group_idx, (group, &alternative)) in positions.iter().zip(choice.as_slice()).enumerate()
    {
        let mut group_basis = None;
        if group.is_empty() {
            return Err(KnitError::Qpd(
                resolve_error("empty-position-group", "position group has no markers")
                    .with_context("group", group_idx),
            ));
        }
        for &idx in group {
            let marker = circuit
                .instructions()
                .get(idx)
                .and_then(|inst| inst.operation.as_cut())
                .ok_or_else(|| {
                    KnitError::Qpd(
                        resolve_error("not-a-cut-marker", "position does not hold a cut marker")
                            .with_context("group", group_idx)
                            .with_context("position", idx),
                    )
                })?;
            let basis = marker.basis();
            match group_basis {
                None => group_basis = Some(basis),
                Some(first) if Arc::ptr_eq(first, basis) || first == basis => {}
                Some(_) => {
                    return Err(KnitError::Qpd(
                        resolve_error(
                            "mixed-bases",
                            "markers of one position group must share a basis",
                        )
                        .with_context("group", group_idx)
                        .with_context("position", idx),
                    ))
                }
            }
            if alternative >= basis.num_alternatives() {
                return Err(KnitError::Qpd(
                    resolve_error("alternative-out-of-range", "basis has no such alternative")
                        .with_context("position", idx)
                        .with_context("alternative", alternative)
                        .with_context("alternatives", basis.num_alternatives()),
                ));
            }
            if chosen.insert(idx, alternative).is_some() {
                return Err(KnitError::Qpd(
                    resolve_error("duplicate-position", "marker addressed more than once")
                        .with_context("position", idx),
                ));
            }
        }
    }
    Ok(chosen)
}

fn party_ops<'a>(
    marker: &'a CutMarker,
    alternative: usize,
    qubits: &[usize],
    position: usize,
) -> Result<Vec<(usize, &'a [LocalOp])>, KnitError> {
    let map = marker.basis().map(alternative).ok_or_else(|| {
        KnitError::Qpd(
            resolve_error("alternative-out-of-range", "basis has no such alternative")
                .with_context("position", position)
                .with_context("alternative", alternative),
        )
    })?;
    let parties: Vec<usize> = match marker.kind() {
        MarkerKind::TwoParty => (0..map.len()).collect(),
        MarkerKind::OneParty { party, .. } => vec![party],
    };
    if parties.len() != qubits.len() || parties.iter().any(|&party| party >= map.len()) {
        return Err(KnitError::Qpd(
            resolve_error(
                "marker-shape-mismatch",
                "cut marker qubits do not line up with the parties of its basis",
            )
            .with_context("position", position)
            .with_context("qubits", qubits.len())
            .with_context("parties", map.len()),
        ));
    }
    Ok(qubits
        .iter()
        .zip(parties)
        .map(|(&qubit, party)| (qubit, map[party].as_slice()))
        .collect())
}
