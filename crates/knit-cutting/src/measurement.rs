use knit_circuit::{Circuit, Clbit};
use knit_core::errors::{ErrorInfo, KnitError};
use knit_obs::CommutingObservableGroup;

/// Name of the register appended for observable measurements.
pub const OBSERVABLE_MEASUREMENT_REGISTER: &str = "observable_measurements";

/// Returns a copy of `circuit` measuring `group` into a new final register.
///
/// `qubit_locations[q]` is the circuit qubit holding observable qubit `q`;
/// without it the circuit and the observables must have the same width.
pub fn append_measurement_circuit(
    circuit: &Circuit,
    group: &CommutingObservableGroup,
    qubit_locations: Option<&[usize]>,
) -> Result<Circuit, KnitError> {
    let mut measured = circuit.clone();
    append_measurement_circuit_in_place(&mut measured, group, qubit_locations)?;
    Ok(measured)
}

/// In-place form of [`append_measurement_circuit`].
///
/// The circuit is left untouched when validation fails.
pub fn append_measurement_circuit_in_place(
    circuit: &mut Circuit,
    group: &CommutingObservableGroup,
    qubit_locations: Option<&[usize]>,
) -> Result<(), KnitError> {
    let width = group.num_qubits();
    let identity: Vec<usize>;
    let locations = match qubit_locations {
        None => {
            if circuit.num_qubits() != width {
                return Err(KnitError::Observable(
                    ErrorInfo::new(
                        "site-count-mismatch",
                        format!(
                            "circuit qubit count ({}) does not match qubit count of observable(s) ({})",
                            circuit.num_qubits(),
                            width
                        ),
                    )
                    .with_context("circuit_qubits", circuit.num_qubits())
                    .with_context("observable_qubits", width)
                    .with_hint("provide qubit_locations explicitly"),
                ));
            }
            identity = (0..width).collect();
            identity.as_slice()
        }
        Some(locations) => {
            if locations.len() != width {
                return Err(KnitError::Observable(
                    ErrorInfo::new(
                        "site-count-mismatch",
                        format!(
                            "qubit_locations has {} element(s) but the observable(s) have {} qubit(s)",
                            locations.len(),
                            width
                        ),
                    )
                    .with_context("qubit_locations", locations.len())
                    .with_context("observable_qubits", width),
                ));
            }
            if let Some(&qubit) = locations.iter().find(|&&q| q >= circuit.num_qubits()) {
                return Err(KnitError::Observable(
                    ErrorInfo::new("qubit-location-out-of-range", "qubit location outside the circuit")
                        .with_context("qubit", qubit)
                        .with_context("num_qubits", circuit.num_qubits()),
                ));
            }
            locations
        }
    };

    let register =
        circuit.add_register(OBSERVABLE_MEASUREMENT_REGISTER, group.pauli_indices().len())?;
    let general = group.general_observable();
    for (bit, &site) in group.pauli_indices().iter().enumerate() {
        let qubit = locations[site];
        if general.x()[site] {
            if general.z()[site] {
                circuit.sdg(qubit)?;
            }
            circuit.h(qubit)?;
        }
        circuit.measure(qubit, Clbit::new(register, bit))?;
    }
    Ok(())
}
