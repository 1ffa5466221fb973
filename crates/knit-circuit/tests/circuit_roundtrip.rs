use std::sync::Arc;

use knit_circuit::{
    canonical_hash, circuit_from_bytes, circuit_from_json, circuit_to_bytes, circuit_to_json,
    Circuit, Clbit, CutMarker, Gate, LocalOp, MarkerKind, Operation, QpdBasis,
};
use knit_core::CutId;

fn sign_basis() -> Arc<QpdBasis> {
    Arc::new(
        QpdBasis::new(
            vec![
                vec![vec![], vec![]],
                vec![vec![LocalOp::gate(Gate::Z)], vec![LocalOp::Measure]],
            ],
            vec![1.0, -1.0],
        )
        .unwrap(),
    )
}

fn sample_circuit() -> Circuit {
    let mut circuit = Circuit::new(3);
    let creg = circuit.add_register("c", 3).unwrap();
    circuit.h(0).unwrap();
    circuit.gate(Gate::Rz { theta: 0.25 }, &[1]).unwrap();
    circuit
        .cut(CutMarker::two_party(sign_basis()).unwrap(), &[0, 1])
        .unwrap();
    circuit
        .cut(
            CutMarker::one_party(sign_basis(), 1, Some(CutId::from_raw(4)))
                .unwrap()
                .with_label("cut_4"),
            &[2],
        )
        .unwrap();
    for qubit in 0..3 {
        circuit.measure(qubit, Clbit::new(creg, qubit)).unwrap();
    }
    circuit
}

#[test]
fn json_and_bytes_roundtrip_preserve_hash() {
    let circuit = sample_circuit();
    let hash_before = canonical_hash(&circuit).unwrap();

    let json = circuit_to_json(&circuit).unwrap();
    let restored = circuit_from_json(&json).unwrap();
    assert_eq!(restored, circuit);
    assert_eq!(canonical_hash(&restored).unwrap(), hash_before);

    let bytes = circuit_to_bytes(&circuit).unwrap();
    let restored = circuit_from_bytes(&bytes).unwrap();
    assert_eq!(restored, circuit);

    let markers: Vec<_> = restored.cut_markers().map(|(idx, m)| (idx, m.kind())).collect();
    assert_eq!(
        markers,
        vec![
            (2, MarkerKind::TwoParty),
            (
                3,
                MarkerKind::OneParty {
                    party: 1,
                    cut_id: Some(CutId::from_raw(4))
                }
            )
        ]
    );
}

#[test]
fn hash_tracks_gate_parameters() {
    let mut a = Circuit::new(1);
    a.gate(Gate::Rx { theta: 0.5 }, &[0]).unwrap();
    let mut b = Circuit::new(1);
    b.gate(Gate::Rx { theta: 0.75 }, &[0]).unwrap();
    assert_ne!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
}

#[test]
fn json_replays_validation() {
    let json = r#"{
        "num_qubits": 1,
        "instructions": [{"operation": {"type": "gate", "gate": {"name": "cx"}}, "qubits": [0, 1]}]
    }"#;
    assert!(circuit_from_json(json).is_err());

    let json = r#"{
        "num_qubits": 2,
        "instructions": [{"operation": {"type": "gate", "gate": {"name": "cx"}}, "qubits": [0, 1]}]
    }"#;
    let circuit = circuit_from_json(json).unwrap();
    assert_eq!(
        circuit.instructions()[0].operation,
        Operation::Gate { gate: Gate::Cx }
    );
}

fn tampered(edit: impl FnOnce(&mut serde_json::Value)) -> String {
    let mut value: serde_json::Value =
        serde_json::from_str(&circuit_to_json(&sample_circuit()).unwrap()).unwrap();
    edit(&mut value);
    serde_json::to_string(&value).unwrap()
}

#[test]
fn loaded_markers_are_revalidated() {
    let json = tampered(|value| {
        value["instructions"][3]["operation"]["marker"]["kind"]["party"] = serde_json::json!(7);
    });
    let err = circuit_from_json(&json).unwrap_err();
    assert_eq!(err.code(), "deserialize-json");
    assert!(err.info().message.contains("party-out-of-range"));

    let one_party_basis =
        QpdBasis::new(vec![vec![vec![]], vec![vec![LocalOp::Measure]]], vec![1.0, 1.0]).unwrap();
    let json = tampered(|value| {
        value["instructions"][2]["operation"]["marker"]["basis"] =
            serde_json::to_value(&one_party_basis).unwrap();
    });
    let err = circuit_from_json(&json).unwrap_err();
    assert!(err.info().message.contains("marker-basis-mismatch"));

    let untouched = tampered(|_| {});
    assert_eq!(circuit_from_json(&untouched).unwrap(), sample_circuit());
}
