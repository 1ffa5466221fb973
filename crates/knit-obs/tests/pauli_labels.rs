use knit_obs::{Pauli, PauliList};
use proptest::prelude::*;

#[test]
fn rightmost_character_is_qubit_zero() {
    let pauli = Pauli::from_label("XYZI").unwrap();
    assert_eq!(pauli.num_qubits(), 4);
    assert_eq!(pauli.x(), &[false, false, true, true]);
    assert_eq!(pauli.z(), &[false, true, true, false]);
    assert_eq!(pauli.support(), vec![1, 2, 3]);
    assert_eq!(pauli.to_label(), "XYZI");
}

#[test]
fn phase_prefixes_are_dropped() {
    for label in ["-ZX", "+ZX", "iZX", "-iZX", "-jZX"] {
        assert_eq!(Pauli::from_label(label).unwrap().to_label(), "ZX");
    }
    assert_eq!(Pauli::from_label("IX").unwrap().to_label(), "IX");
}

#[test]
fn malformed_labels_are_rejected() {
    assert_eq!(
        Pauli::from_label("XA").unwrap_err().code(),
        "invalid-pauli-label"
    );
    assert_eq!(Pauli::from_label("-").unwrap_err().code(), "empty-pauli-label");
    for label in ["+-+-X", "--X", "-iiX", "ij X", "i-X"] {
        assert_eq!(
            Pauli::from_label(label).unwrap_err().code(),
            "invalid-pauli-label",
            "{label}"
        );
    }
    assert_eq!(
        Pauli::from_components(vec![true], vec![]).unwrap_err().code(),
        "component-length-mismatch"
    );
}

#[test]
fn qubitwise_commutation() {
    let zz: Pauli = "ZZ".parse().unwrap();
    let iz: Pauli = "IZ".parse().unwrap();
    let xz: Pauli = "XZ".parse().unwrap();
    assert!(zz.qubitwise_commutes(&iz));
    assert!(iz.qubitwise_commutes(&xz));
    assert!(!zz.qubitwise_commutes(&xz));
    assert!(!zz.qubitwise_commutes(&Pauli::identity(3)));
}

#[test]
fn lists_require_uniform_width() {
    assert_eq!(
        PauliList::new(Vec::new()).unwrap_err().code(),
        "empty-observable-list"
    );
    assert_eq!(
        PauliList::from_labels(["ZZ", "Z"]).unwrap_err().code(),
        "inconsistent-qubit-count"
    );
    let list = PauliList::from_labels(["ZZ", "XI"]).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.num_qubits(), 2);
}

#[test]
fn lists_serialize_as_labels() {
    let list = PauliList::from_labels(["ZZI", "XIY"]).unwrap();
    let json = serde_json::to_string(&list).unwrap();
    assert_eq!(json, r#"["ZZI","XIY"]"#);
    let restored: PauliList = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, list);
    assert!(serde_json::from_str::<PauliList>(r#"["Z","ZZ"]"#).is_err());
}

proptest! {
    #[test]
    fn labels_reproduce(label in "[IXYZ]{1,12}") {
        let pauli = Pauli::from_label(&label).unwrap();
        prop_assert_eq!(pauli.to_label(), label);
    }
}
