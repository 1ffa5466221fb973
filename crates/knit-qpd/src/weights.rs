use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use knit_circuit::QpdBasis;
use knit_core::errors::{ErrorInfo, KnitError};
use knit_core::rng::RngHandle;
use knit_core::SampleBudget;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Probability mass below which the unsampled remainder is dropped.
const MASS_EPSILON: f64 = 1e-12;
/// Candidate masses below this are treated as already covered exactly.
const CANDIDATE_EPSILON: f64 = 1e-15;
/// Relative slack when comparing a choice probability against `1 / budget`.
const THRESHOLD_SLACK: f64 = 1e-12;

/// How the weight of a joint choice was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightType {
    /// Computed from the distribution without randomness.
    Exact,
    /// Estimated from Monte Carlo draws.
    Sampled,
}

/// Occurrence mass of one joint choice and how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleWeight {
    /// Occurrence mass; a draw count for sampled choices.
    pub redundancy: f64,
    /// Exact or sampled.
    pub weight_type: WeightType,
}

/// One alternative index per cut, in ascending cut-identity order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointChoice(Vec<usize>);

impl JointChoice {
    /// Wraps a list of alternative indices.
    pub fn new(alternatives: Vec<usize>) -> Self {
        Self(alternatives)
    }

    /// Alternative indices.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of cuts covered by the choice.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the choice over zero cuts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selects the entries at the given slots, in slot order.
    pub fn restrict(&self, slots: &[usize]) -> Result<JointChoice, KnitError> {
        slots
            .iter()
            .map(|&slot| {
                self.0.get(slot).copied().ok_or_else(|| {
                    KnitError::Qpd(
                        ErrorInfo::new("choice-slot-out-of-range", "joint choice has no such slot")
                            .with_context("slot", slot)
                            .with_context("len", self.0.len()),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(JointChoice)
    }
}

impl From<Vec<usize>> for JointChoice {
    fn from(value: Vec<usize>) -> Self {
        Self(value)
    }
}

/// Sampled joint choices keyed in ascending lexicographic order.
pub type SampleSet = BTreeMap<JointChoice, SampleWeight>;

/// Draws joint choices from the product distribution of a list of bases.
pub trait WeightSampler: Send + Sync {
    /// Returns every drawn joint choice with its occurrence mass.
    fn sample(&self, bases: &[Arc<QpdBasis>], budget: SampleBudget)
        -> Result<SampleSet, KnitError>;
}

/// Default sampler: exact enumeration of likely choices, Monte Carlo for the rest.
///
/// Draws come from stream `stream` of the master `seed`, so runs that share a
/// seed but use different streams sample independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QpdWeightSampler {
    seed: u64,
    stream: u64,
}

impl QpdWeightSampler {
    /// Creates a sampler on stream 0 of `seed`.
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Returns a copy drawing from another stream of the same seed.
    pub fn with_stream(mut self, stream: u64) -> Self {
        self.stream = stream;
        self
    }

    /// Master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream number.
    pub fn stream(&self) -> u64 {
        self.stream
    }
}

impl WeightSampler for QpdWeightSampler {
    fn sample(
        &self,
        bases: &[Arc<QpdBasis>],
        budget: SampleBudget,
    ) -> Result<SampleSet, KnitError> {
        let mut rng = RngHandle::substream(self.seed, self.stream);
        generate_qpd_weights(bases, budget, &mut rng)
    }
}

/// Generates joint choice weights for the product distribution of `bases`.
///
/// With an unbounded budget every choice of non-zero probability is returned
/// with its probability as weight. With a finite budget `n`, choices of
/// probability at least `1/n` get the exact weight `p * n`; the remaining mass
/// is spread over `max(1, n - exact)` draws from the distribution conditioned
/// on not hitting an exact choice. Weights always sum to the budget (to 1 when
/// unbounded).
pub fn generate_qpd_weights(
    bases: &[Arc<QpdBasis>],
    budget: SampleBudget,
    rng: &mut RngHandle,
) -> Result<SampleSet, KnitError> {
    budget.validate()?;
    let probabilities: Vec<&[f64]> = bases.iter().map(|basis| basis.probabilities()).collect();
    let (scale, threshold) = match budget {
        SampleBudget::Finite(n) => (n as f64, 1.0 / n as f64),
        SampleBudget::Unbounded => (1.0, 0.0),
    };

    let exact = enumerate_exact(&probabilities, threshold);
    let mut weights = SampleSet::new();
    let mut exact_mass = 0.0;
    for (choice, probability) in &exact {
        exact_mass += probability;
        weights.insert(
            JointChoice(choice.clone()),
            SampleWeight {
                redundancy: probability * scale,
                weight_type: WeightType::Exact,
            },
        );
    }

    let remaining = 1.0 - exact_mass;
    let mut sampled = 0usize;
    if let SampleBudget::Finite(n) = budget {
        if remaining > MASS_EPSILON {
            let draws = usize::try_from(n)
                .unwrap_or(usize::MAX)
                .saturating_sub(exact.len())
                .max(1);
            let covered = exact_prefix_mass(&exact);
            let per_draw = remaining * scale / draws as f64;
            let mut counts: BTreeMap<Vec<usize>, u64> = BTreeMap::new();
            for _ in 0..draws {
                let choice = draw_conditional(&probabilities, &covered, rng)?;
                *counts.entry(choice).or_insert(0) += 1;
            }
            sampled = counts.len();
            for (choice, count) in counts {
                let mass = count as f64 * per_draw;
                weights
                    .entry(JointChoice(choice))
                    .and_modify(|weight| weight.redundancy += mass)
                    .or_insert(SampleWeight {
                        redundancy: mass,
                        weight_type: WeightType::Sampled,
                    });
            }
        }
    }

    debug!(
        bases = bases.len(),
        budget = %budget,
        exact = exact.len(),
        sampled,
        remaining_mass = remaining,
        "generated qpd weights"
    );
    Ok(weights)
}

fn enumerate_exact(probabilities: &[&[f64]], threshold: f64) -> Vec<(Vec<usize>, f64)> {
    let mut out = Vec::new();
    let mut prefix = Vec::with_capacity(probabilities.len());
    visit_exact(
        probabilities,
        threshold * (1.0 - THRESHOLD_SLACK),
        1.0,
        &mut prefix,
        &mut out,
    );
    out
}

fn visit_exact(
    probabilities: &[&[f64]],
    threshold: f64,
    mass: f64,
    prefix: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, f64)>,
) {
    let depth = prefix.len();
    if depth == probabilities.len() {
        out.push((prefix.clone(), mass));
        return;
    }
    // Every further factor is at most 1, so a prefix below the threshold
    // cannot grow back above it.
    for (alternative, &p) in probabilities[depth].iter().enumerate() {
        let next = mass * p;
        if next <= 0.0 || next < threshold {
            continue;
        }
        prefix.push(alternative);
        visit_exact(probabilities, threshold, next, prefix, out);
        prefix.pop();
    }
}

fn exact_prefix_mass(exact: &[(Vec<usize>, f64)]) -> HashMap<Vec<usize>, f64> {
    let mut covered = HashMap::new();
    for (choice, probability) in exact {
        for end in 1..=choice.len() {
            *covered.entry(choice[..end].to_vec()).or_insert(0.0) += probability;
        }
    }
    covered
}

fn draw_conditional(
    probabilities: &[&[f64]],
    covered: &HashMap<Vec<usize>, f64>,
    rng: &mut RngHandle,
) -> Result<Vec<usize>, KnitError> {
    let mut prefix = Vec::with_capacity(probabilities.len());
    let mut mass = 1.0;
    for (depth, probs) in probabilities.iter().enumerate() {
        let mut candidates = Vec::with_capacity(probs.len());
        for (alternative, &p) in probs.iter().enumerate() {
            prefix.push(alternative);
            let excluded = covered.get(&prefix).copied().unwrap_or(0.0);
            prefix.pop();
            let free = mass * p - excluded;
            candidates.push(if free > CANDIDATE_EPSILON { free } else { 0.0 });
        }
        let total: f64 = candidates.iter().sum();
        if total <= 0.0 {
            return Err(KnitError::Qpd(
                ErrorInfo::new(
                    "sampling-exhausted",
                    "no probability mass left outside the exact choices",
                )
                .with_context("depth", depth),
            ));
        }
        let mut target = rng.unit_f64() * total;
        let mut chosen = None;
        for (alternative, &weight) in candidates.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            chosen = Some(alternative);
            if target < weight {
                break;
            }
            target -= weight;
        }
        // `total > 0` guarantees at least one positive candidate.
        let alternative = chosen.unwrap_or(0);
        prefix.push(alternative);
        mass *= probs[alternative];
    }
    Ok(prefix)
}
