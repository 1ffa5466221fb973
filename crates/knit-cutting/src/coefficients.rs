use std::sync::Arc;

use knit_circuit::QpdBasis;
use knit_core::errors::{ErrorInfo, KnitError};
use knit_qpd::{JointChoice, SampleSet, SampleWeight, WeightType};
use serde::{Deserialize, Serialize};

/// Signed reconstruction coefficient of one joint choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// `redundancy / total_mass * kappa_total * sign(product of chosen coefficients)`.
    pub value: f64,
    /// Whether the choice was enumerated exactly or sampled.
    pub weight_type: WeightType,
}

/// Product of the overheads of every basis; 1 for no bases.
pub fn kappa_total(bases: &[Arc<QpdBasis>]) -> f64 {
    bases.iter().map(|basis| basis.kappa()).product()
}

/// Samples in descending redundancy; ties keep ascending choice order.
pub fn sorted_samples(samples: &SampleSet) -> Vec<(&JointChoice, &SampleWeight)> {
    let mut ordered: Vec<_> = samples.iter().collect();
    ordered.sort_by(|a, b| b.1.redundancy.total_cmp(&a.1.redundancy));
    ordered
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Computes the coefficient of every sampled joint choice in output order.
///
/// Only the sign of the product of chosen coefficients is kept; its magnitude
/// is already accounted for by the sampling probability.
pub fn compute_coefficients(
    bases: &[Arc<QpdBasis>],
    samples: &SampleSet,
) -> Result<Vec<(JointChoice, Coefficient)>, KnitError> {
    let total_mass: f64 = samples.values().map(|weight| weight.redundancy).sum();
    if samples.is_empty() || total_mass <= 0.0 || !total_mass.is_finite() {
        return Err(KnitError::Cutting(
            ErrorInfo::new("empty-sample-set", "sampler returned no probability mass")
                .with_context("choices", samples.len())
                .with_context("total_mass", total_mass),
        ));
    }
    let kappa = kappa_total(bases);

    sorted_samples(samples)
        .into_iter()
        .map(|(choice, weight)| {
            if choice.len() != bases.len() {
                return Err(KnitError::Cutting(
                    ErrorInfo::new(
                        "choice-length-mismatch",
                        "joint choice must have one entry per cut",
                    )
                    .with_context("choice", choice.len())
                    .with_context("bases", bases.len()),
                ));
            }
            let mut product = 1.0;
            for (cut, (basis, &alternative)) in bases.iter().zip(choice.as_slice()).enumerate() {
                let coeff = basis.coeffs().get(alternative).ok_or_else(|| {
                    KnitError::Cutting(
                        ErrorInfo::new("alternative-out-of-range", "basis has no such alternative")
                            .with_context("cut", cut)
                            .with_context("alternative", alternative),
                    )
                })?;
                product *= coeff;
            }
            let coefficient = Coefficient {
                value: weight.redundancy / total_mass * kappa * sign(product),
                weight_type: weight.weight_type,
            };
            Ok((choice.clone(), coefficient))
        })
        .collect()
}
