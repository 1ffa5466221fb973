use std::sync::Arc;

use knit_circuit::{LocalOp, QpdBasis};
use knit_cutting::{compute_coefficients, kappa_total, sorted_samples};
use knit_qpd::{JointChoice, SampleSet, SampleWeight, WeightType};
use proptest::prelude::*;

fn basis(coeffs: &[f64]) -> Arc<QpdBasis> {
    let maps = coeffs
        .iter()
        .map(|_| vec![vec![LocalOp::Measure], vec![]])
        .collect();
    Arc::new(QpdBasis::new(maps, coeffs.to_vec()).expect("basis"))
}

fn weight(redundancy: f64, weight_type: WeightType) -> SampleWeight {
    SampleWeight {
        redundancy,
        weight_type,
    }
}

#[test]
fn kappa_multiplies_across_cuts() {
    assert_eq!(kappa_total(&[]), 1.0);
    let bases = vec![basis(&[1.0, -1.0]), basis(&[0.5, 0.5, -0.5])];
    assert!((kappa_total(&bases) - 3.0).abs() < 1e-12);
}

#[test]
fn coefficients_keep_only_the_sign_of_the_product() {
    let bases = vec![basis(&[1.0, -1.0])];
    let samples: SampleSet = [
        (JointChoice::new(vec![0]), weight(2.0, WeightType::Exact)),
        (JointChoice::new(vec![1]), weight(2.0, WeightType::Exact)),
    ]
    .into_iter()
    .collect();
    let weighted = compute_coefficients(&bases, &samples).expect("coefficients");
    assert_eq!(weighted.len(), 2);
    assert_eq!(weighted[0].0, JointChoice::new(vec![0]));
    assert!((weighted[0].1.value - 1.0).abs() < 1e-12);
    assert!((weighted[1].1.value + 1.0).abs() < 1e-12);
    assert_eq!(weighted[1].1.weight_type, WeightType::Exact);
}

#[test]
fn zero_coefficient_yields_zero_weight() {
    let bases = vec![basis(&[1.0, 0.0, -1.0])];
    let samples: SampleSet = [
        (JointChoice::new(vec![0]), weight(1.0, WeightType::Sampled)),
        (JointChoice::new(vec![1]), weight(1.0, WeightType::Sampled)),
    ]
    .into_iter()
    .collect();
    let weighted = compute_coefficients(&bases, &samples).expect("coefficients");
    assert_eq!(weighted[1].1.value, 0.0);
    assert!((weighted[0].1.value - 1.0).abs() < 1e-12);
}

#[test]
fn no_cuts_give_a_single_positive_coefficient() {
    let samples: SampleSet = [(JointChoice::new(Vec::new()), weight(10.0, WeightType::Exact))]
        .into_iter()
        .collect();
    let weighted = compute_coefficients(&[], &samples).expect("coefficients");
    assert_eq!(weighted.len(), 1);
    assert_eq!(weighted[0].1.value, 1.0);
}

#[test]
fn ties_keep_lexicographic_order() {
    let samples: SampleSet = [
        (JointChoice::new(vec![2, 0]), weight(3.0, WeightType::Sampled)),
        (JointChoice::new(vec![0, 1]), weight(1.0, WeightType::Sampled)),
        (JointChoice::new(vec![1, 1]), weight(3.0, WeightType::Sampled)),
        (JointChoice::new(vec![0, 0]), weight(1.0, WeightType::Sampled)),
    ]
    .into_iter()
    .collect();
    let order: Vec<_> = sorted_samples(&samples)
        .into_iter()
        .map(|(choice, _)| choice.as_slice().to_vec())
        .collect();
    assert_eq!(order, vec![vec![1, 1], vec![2, 0], vec![0, 0], vec![0, 1]]);
}

#[test]
fn malformed_samples_are_rejected() {
    let bases = vec![basis(&[1.0, -1.0])];
    let empty = compute_coefficients(&bases, &SampleSet::new()).unwrap_err();
    assert_eq!(empty.code(), "empty-sample-set");

    let short: SampleSet = [(JointChoice::new(Vec::new()), weight(1.0, WeightType::Exact))]
        .into_iter()
        .collect();
    assert_eq!(
        compute_coefficients(&bases, &short).unwrap_err().code(),
        "choice-length-mismatch"
    );

    let out_of_range: SampleSet = [(JointChoice::new(vec![5]), weight(1.0, WeightType::Exact))]
        .into_iter()
        .collect();
    assert_eq!(
        compute_coefficients(&bases, &out_of_range).unwrap_err().code(),
        "alternative-out-of-range"
    );
}

proptest! {
    #[test]
    fn magnitudes_are_ordered_and_sum_to_kappa(
        redundancies in proptest::collection::vec(1u32..50, 1..16),
    ) {
        let bases = vec![basis(&[1.0, -1.0, 0.5, -0.5]), basis(&[0.5, -0.5, 0.25, 0.25])];
        let samples: SampleSet = redundancies
            .iter()
            .enumerate()
            .map(|(idx, &r)| {
                (
                    JointChoice::new(vec![idx % 4, idx / 4]),
                    weight(f64::from(r), WeightType::Sampled),
                )
            })
            .collect();
        let weighted = compute_coefficients(&bases, &samples).expect("coefficients");
        prop_assert_eq!(weighted.len(), samples.len());
        let magnitudes: Vec<f64> = weighted.iter().map(|(_, c)| c.value.abs()).collect();
        for pair in magnitudes.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
        let total: f64 = magnitudes.iter().sum();
        prop_assert!((total - kappa_total(&bases)).abs() < 1e-9);
    }
}
