use knit_circuit::{Gate, LocalOp, QpdBasis};

fn op(gate: Gate) -> LocalOp {
    LocalOp::gate(gate)
}

#[test]
fn kappa_and_probabilities_follow_coefficients() {
    let basis = QpdBasis::new(
        vec![
            vec![vec![], vec![]],
            vec![vec![op(Gate::Z)], vec![op(Gate::Z)]],
            vec![vec![LocalOp::Measure], vec![op(Gate::Sdg)]],
        ],
        vec![0.5, 0.5, -1.0],
    )
    .unwrap();
    assert_eq!(basis.num_alternatives(), 3);
    assert_eq!(basis.num_parties(), 2);
    assert!((basis.kappa() - 2.0).abs() < 1e-12);
    assert_eq!(basis.probabilities(), &[0.25, 0.25, 0.5]);
    assert_eq!(basis.map(2).unwrap()[0], vec![LocalOp::Measure]);
    assert!(basis.map(3).is_none());
}

#[test]
fn rejects_malformed_bases() {
    let empty = QpdBasis::new(Vec::new(), Vec::new()).unwrap_err();
    assert_eq!(empty.code(), "empty-basis");

    let lengths = QpdBasis::new(vec![vec![vec![]]], vec![1.0, 1.0]).unwrap_err();
    assert_eq!(lengths.code(), "basis-length-mismatch");

    let parties =
        QpdBasis::new(vec![vec![vec![]], vec![vec![], vec![]]], vec![1.0, 1.0]).unwrap_err();
    assert_eq!(parties.code(), "inconsistent-party-count");

    let nonlocal = QpdBasis::new(vec![vec![vec![op(Gate::Cx)]]], vec![1.0]).unwrap_err();
    assert_eq!(nonlocal.code(), "non-local-operation");

    let small = QpdBasis::new(vec![vec![vec![]]], vec![0.5]).unwrap_err();
    assert_eq!(small.code(), "kappa-below-one");

    let nan = QpdBasis::new(vec![vec![vec![]]], vec![f64::NAN]).unwrap_err();
    assert_eq!(nan.code(), "non-finite-coefficient");
}

#[test]
fn basis_json_revalidates() {
    let basis = QpdBasis::new(
        vec![vec![vec![op(Gate::H)]], vec![vec![LocalOp::Measure]]],
        vec![1.0, -1.0],
    )
    .unwrap();
    let json = serde_json::to_string(&basis).unwrap();
    let restored: QpdBasis = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, basis);

    let tampered = r#"{"maps":[[[]]],"coeffs":[0.1]}"#;
    assert!(serde_json::from_str::<QpdBasis>(tampered).is_err());
}
