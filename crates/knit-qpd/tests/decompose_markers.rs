use std::sync::Arc;

use knit_circuit::{Circuit, Clbit, CutMarker, Gate, LocalOp, Operation, QpdBasis};
use knit_core::CutId;
use knit_qpd::{
    decompose_qpd_instructions, CircuitResolver, JointChoice, QpdResolver,
    QPD_MEASUREMENT_REGISTER,
};

fn measure_basis() -> Arc<QpdBasis> {
    Arc::new(
        QpdBasis::new(
            vec![
                vec![vec![LocalOp::gate(Gate::H)], vec![LocalOp::gate(Gate::X)]],
                vec![vec![LocalOp::Measure], vec![LocalOp::Measure]],
                vec![vec![LocalOp::gate(Gate::S)], vec![]],
            ],
            vec![0.5, -0.5, 0.5],
        )
        .unwrap(),
    )
}

fn two_party_circuit() -> Circuit {
    let mut circuit = Circuit::new(3);
    let creg = circuit.add_register("c", 1).unwrap();
    circuit.h(2).unwrap();
    circuit
        .cut(CutMarker::two_party(measure_basis()).unwrap(), &[0, 1])
        .unwrap();
    circuit.measure(2, Clbit::new(creg, 0)).unwrap();
    circuit
}

fn ops(circuit: &Circuit) -> Vec<(Operation, Vec<usize>, Vec<Clbit>)> {
    circuit
        .instructions()
        .iter()
        .map(|inst| (inst.operation.clone(), inst.qubits.clone(), inst.clbits.clone()))
        .collect()
}

#[test]
fn two_party_marker_expands_both_parties() {
    let circuit = two_party_circuit();
    let resolved =
        decompose_qpd_instructions(&circuit, &[vec![1]], &JointChoice::new(vec![0])).unwrap();
    assert_eq!(resolved.cut_markers().count(), 0);
    assert_eq!(resolved.cregs().len(), 1);
    assert_eq!(
        ops(&resolved),
        vec![
            (Operation::Gate { gate: Gate::H }, vec![2], vec![]),
            (Operation::Gate { gate: Gate::H }, vec![0], vec![]),
            (Operation::Gate { gate: Gate::X }, vec![1], vec![]),
            (Operation::Measure, vec![2], vec![Clbit::new(0, 0)]),
        ]
    );
}

#[test]
fn qpd_measurements_get_their_own_register() {
    let circuit = two_party_circuit();
    let resolved = QpdResolver
        .resolve(&circuit, &[vec![1]], &JointChoice::new(vec![1]))
        .unwrap();
    let register = resolved.register_index(QPD_MEASUREMENT_REGISTER).unwrap();
    assert_eq!(register, 1);
    assert_eq!(resolved.cregs()[register].size, 2);
    let measures: Vec<_> = ops(&resolved)
        .into_iter()
        .filter(|(op, _, clbits)| *op == Operation::Measure && clbits[0].register == register)
        .map(|(_, qubits, clbits)| (qubits[0], clbits[0].index))
        .collect();
    assert_eq!(measures, vec![(0, 0), (1, 1)]);
    // The input is untouched.
    assert_eq!(circuit, two_party_circuit());
}

#[test]
fn empty_party_sequences_emit_nothing() {
    let circuit = two_party_circuit();
    let resolved =
        decompose_qpd_instructions(&circuit, &[vec![1]], &JointChoice::new(vec![2])).unwrap();
    assert_eq!(resolved.len(), 3);
    assert!(resolved.register_index(QPD_MEASUREMENT_REGISTER).is_none());
}

#[test]
fn one_party_markers_share_one_choice() {
    let basis = measure_basis();
    let mut circuit = Circuit::new(2);
    circuit
        .cut(
            CutMarker::one_party(basis.clone(), 0, Some(CutId::from_raw(7))).unwrap(),
            &[0],
        )
        .unwrap();
    circuit
        .cut(
            CutMarker::one_party(basis, 1, Some(CutId::from_raw(7))).unwrap(),
            &[1],
        )
        .unwrap();

    let resolved =
        decompose_qpd_instructions(&circuit, &[vec![0, 1]], &JointChoice::new(vec![0])).unwrap();
    assert_eq!(
        ops(&resolved),
        vec![
            (Operation::Gate { gate: Gate::H }, vec![0], vec![]),
            (Operation::Gate { gate: Gate::X }, vec![1], vec![]),
        ]
    );

    let measured =
        decompose_qpd_instructions(&circuit, &[vec![0, 1]], &JointChoice::new(vec![1])).unwrap();
    assert_eq!(measured.cregs().len(), 1);
    assert_eq!(measured.cregs()[0].name, QPD_MEASUREMENT_REGISTER);
    assert_eq!(measured.num_clbits(), 2);
}

#[test]
fn invalid_positions_are_rejected() {
    let circuit = two_party_circuit();
    let cases: Vec<(Vec<Vec<usize>>, Vec<usize>, &str)> = vec![
        (vec![vec![1]], vec![0, 0], "choice-length-mismatch"),
        (vec![vec![]], vec![0], "empty-position-group"),
        (vec![vec![0]], vec![0], "not-a-cut-marker"),
        (vec![vec![9]], vec![0], "not-a-cut-marker"),
        (vec![vec![1]], vec![3], "alternative-out-of-range"),
        (vec![vec![1], vec![1]], vec![0, 0], "duplicate-position"),
        (vec![], vec![], "unresolved-cut-marker"),
    ];
    for (positions, choice, code) in cases {
        let err = decompose_qpd_instructions(&circuit, &positions, &JointChoice::new(choice))
            .unwrap_err();
        assert_eq!(err.code(), code);
    }
}

#[test]
fn markers_with_different_bases_cannot_share_a_group() {
    let other = Arc::new(
        QpdBasis::new(vec![vec![vec![]], vec![vec![LocalOp::Measure]]], vec![1.0, 1.0]).unwrap(),
    );
    let mut circuit = Circuit::new(2);
    circuit
        .cut(CutMarker::one_party(measure_basis(), 0, None).unwrap(), &[0])
        .unwrap();
    circuit
        .cut(CutMarker::one_party(other, 0, None).unwrap(), &[1])
        .unwrap();
    let err = decompose_qpd_instructions(&circuit, &[vec![0, 1]], &JointChoice::new(vec![0]))
        .unwrap_err();
    assert_eq!(err.code(), "mixed-bases");
}
