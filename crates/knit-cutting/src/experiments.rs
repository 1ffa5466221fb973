use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use knit_circuit::{Circuit, QpdBasis};
use knit_core::errors::{ErrorInfo, KnitError};
use knit_core::{RunProvenance, SampleBudget};
use knit_obs::{CommutingObservableGroup, ObservableGrouper, PauliList, QubitWiseGrouper};
use knit_qpd::{CircuitResolver, JointChoice, QpdResolver, QpdWeightSampler, WeightSampler};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::arena::SlotArena;
use crate::bundle::{input_hash, tool_versions, ExperimentBundle};
use crate::coefficients::{compute_coefficients, kappa_total, Coefficient};
use crate::collect::{collect_partitioned, collect_unified};
use crate::config::CuttingOptions;
use crate::measurement::append_measurement_circuit;

fn shape_error(message: &str) -> KnitError {
    KnitError::Cutting(ErrorInfo::new("input-shape-mismatch", message))
}

/// Circuits to cut: one unseparated circuit, or subcircuits keyed by partition label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
#[serde(bound(
    serialize = "L: Serialize",
    deserialize = "L: Deserialize<'de> + Eq + Hash"
))]
pub enum CircuitInput<L = String> {
    /// A single circuit whose cuts are all two-party markers.
    Unified(Circuit),
    /// Separated subcircuits whose cuts are one-party markers.
    Partitioned(#[serde(with = "indexmap::map::serde_seq")] IndexMap<L, Circuit>),
}

/// Observables matching the shape of a [`CircuitInput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
#[serde(bound(
    serialize = "L: Serialize",
    deserialize = "L: Deserialize<'de> + Eq + Hash"
))]
pub enum ObservableInput<L = String> {
    /// Observables over the full circuit.
    Unified(PauliList),
    /// Observables restricted to each partition.
    Partitioned(#[serde(with = "indexmap::map::serde_seq")] IndexMap<L, PauliList>),
}

/// Generated subexperiments, shaped like the circuit input.
///
/// Within a list, the subexperiments of joint choice `k` occupy the slots
/// `k * groups .. (k + 1) * groups`, ordered by measurement group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
#[serde(bound(
    serialize = "L: Serialize",
    deserialize = "L: Deserialize<'de> + Eq + Hash"
))]
pub enum Subexperiments<L = String> {
    /// Flat list for a unified input.
    Unified(Vec<Circuit>),
    /// One list per partition, in caller label order.
    Partitioned(#[serde(with = "indexmap::map::serde_seq")] IndexMap<L, Vec<Circuit>>),
}

impl<L: PartialEq> PartialEq for Subexperiments<L> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Subexperiments::Unified(a), Subexperiments::Unified(b)) => a == b,
            (Subexperiments::Partitioned(a), Subexperiments::Partitioned(b)) => {
                a.len() == b.len() && a.iter().eq(b.iter())
            }
            _ => false,
        }
    }
}

impl<L> Subexperiments<L> {
    /// Total number of subexperiments across partitions.
    pub fn len(&self) -> usize {
        match self {
            Subexperiments::Unified(circuits) => circuits.len(),
            Subexperiments::Partitioned(buckets) => buckets.values().map(Vec::len).sum(),
        }
    }

    /// Returns true when no subexperiment was generated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The flat list of a unified result.
    pub fn as_unified(&self) -> Option<&[Circuit]> {
        match self {
            Subexperiments::Unified(circuits) => Some(circuits),
            Subexperiments::Partitioned(_) => None,
        }
    }

    /// The buckets of a partitioned result.
    pub fn as_partitioned(&self) -> Option<&IndexMap<L, Vec<Circuit>>> {
        match self {
            Subexperiments::Unified(_) => None,
            Subexperiments::Partitioned(buckets) => Some(buckets),
        }
    }
}

struct PartitionPlan<'a> {
    circuit: &'a Circuit,
    positions: Vec<Vec<usize>>,
    /// Joint choice slots of each position group; `None` uses the full choice.
    slots: Option<Vec<usize>>,
    /// Measurement groups; `None` emits the resolved circuit unmeasured.
    groups: Option<Vec<CommutingObservableGroup>>,
}

impl PartitionPlan<'_> {
    fn outputs_per_choice(&self) -> usize {
        self.groups.as_ref().map_or(1, Vec::len)
    }
}

/// Cutting pipeline over pluggable sampler, grouper and resolver.
#[derive(Debug, Clone)]
pub struct CuttingEngine<S = QpdWeightSampler, G = QubitWiseGrouper, R = QpdResolver> {
    sampler: S,
    grouper: G,
    resolver: R,
    options: CuttingOptions,
}

impl CuttingEngine {
    /// Engine with the default collaborators, seeded from `options`.
    pub fn new(options: CuttingOptions) -> Self {
        Self::with_collaborators(
            QpdWeightSampler::new(options.seed).with_stream(options.stream),
            QubitWiseGrouper,
            QpdResolver,
            options,
        )
    }
}

impl Default for CuttingEngine {
    fn default() -> Self {
        Self::new(CuttingOptions::default())
    }
}

impl<S, G, R> CuttingEngine<S, G, R>
where
    S: WeightSampler,
    G: ObservableGrouper,
    R: CircuitResolver,
{
    /// Engine with caller supplied collaborators.
    pub fn with_collaborators(sampler: S, grouper: G, resolver: R, options: CuttingOptions) -> Self {
        Self {
            sampler,
            grouper,
            resolver,
            options,
        }
    }

    /// Options the engine runs with.
    pub fn options(&self) -> &CuttingOptions {
        &self.options
    }

    /// Generates one subexperiment per (joint choice, measurement group,
    /// partition) and one coefficient per joint choice.
    pub fn generate_cutting_experiments<L>(
        &self,
        circuits: &CircuitInput<L>,
        observables: &ObservableInput<L>,
        num_samples: SampleBudget,
    ) -> Result<(Subexperiments<L>, Vec<Coefficient>), KnitError>
    where
        L: Clone + Eq + Hash + Debug + Send + Sync,
    {
        match (circuits, observables) {
            (CircuitInput::Unified(circuit), ObservableInput::Unified(observables)) => {
                num_samples.validate()?;
                let cuts = collect_unified(circuit)?;
                let plans = vec![PartitionPlan {
                    circuit,
                    positions: cuts.positions,
                    slots: None,
                    groups: Some(self.grouper.group(observables)?),
                }];
                let (mut buckets, coefficients) = self.run(&cuts.bases, &plans, num_samples)?;
                let subexperiments = buckets.pop().unwrap_or_default();
                Ok((Subexperiments::Unified(subexperiments), coefficients))
            }
            (CircuitInput::Partitioned(circuits), ObservableInput::Partitioned(observables)) => {
                num_samples.validate()?;
                check_partition_labels(circuits, observables)?;
                let cuts = collect_partitioned(circuits)?;
                let mut plans = Vec::with_capacity(circuits.len());
                for ((label, circuit), partition) in circuits.iter().zip(cuts.partitions.values()) {
                    let partition_observables = observables
                        .get(label)
                        .ok_or_else(|| label_error(label))?;
                    plans.push(PartitionPlan {
                        circuit,
                        positions: partition.positions.clone(),
                        slots: Some(partition.slots.clone()),
                        groups: Some(self.grouper.group(partition_observables)?),
                    });
                }
                let (buckets, coefficients) = self.run(&cuts.bases, &plans, num_samples)?;
                let subexperiments = circuits.keys().cloned().zip(buckets).collect();
                Ok((Subexperiments::Partitioned(subexperiments), coefficients))
            }
            (CircuitInput::Unified(_), ObservableInput::Partitioned(_)) => Err(shape_error(
                "a single input circuit requires a single observable list",
            )),
            (CircuitInput::Partitioned(_), ObservableInput::Unified(_)) => Err(shape_error(
                "partitioned circuits require observables keyed by the same partition labels",
            )),
        }
    }

    /// Generates one resolved circuit and one coefficient per joint choice,
    /// for reconstructing the circuit's output distribution.
    pub fn generate_distribution_cutting_experiments(
        &self,
        circuit: &Circuit,
        num_samples: SampleBudget,
    ) -> Result<(Vec<Circuit>, Vec<Coefficient>), KnitError> {
        num_samples.validate()?;
        if !circuit.has_measurements() {
            warn!(
                num_qubits = circuit.num_qubits(),
                "circuit has no measurements; its subexperiments produce no outcomes"
            );
        }
        let cuts = collect_unified(circuit)?;
        let plans = vec![PartitionPlan {
            circuit,
            positions: cuts.positions,
            slots: None,
            groups: None,
        }];
        let (mut buckets, coefficients) = self.run(&cuts.bases, &plans, num_samples)?;
        Ok((buckets.pop().unwrap_or_default(), coefficients))
    }

    /// Runs [`Self::generate_cutting_experiments`] and packages the result
    /// with provenance.
    pub fn generate_bundle<L>(
        &self,
        circuits: &CircuitInput<L>,
        observables: &ObservableInput<L>,
        num_samples: SampleBudget,
    ) -> Result<ExperimentBundle<L>, KnitError>
    where
        L: Clone + Eq + Hash + Debug + Send + Sync + Serialize,
    {
        let (subexperiments, coefficients) =
            self.generate_cutting_experiments(circuits, observables, num_samples)?;
        let provenance = RunProvenance {
            input_hash: input_hash(circuits, observables)?,
            seed: self.options.seed,
            stream: self.options.stream,
            num_samples: num_samples.to_string(),
            tool_versions: tool_versions(),
        };
        Ok(ExperimentBundle::new(subexperiments, coefficients, provenance))
    }

    fn run(
        &self,
        bases: &[Arc<QpdBasis>],
        plans: &[PartitionPlan<'_>],
        num_samples: SampleBudget,
    ) -> Result<(Vec<Vec<Circuit>>, Vec<Coefficient>), KnitError> {
        let samples = self.sampler.sample(bases, num_samples)?;
        let (choices, coefficients): (Vec<JointChoice>, Vec<Coefficient>) =
            compute_coefficients(bases, &samples)?.into_iter().unzip();
        let buckets = self.assemble(plans, &choices)?;
        debug!(
            cuts = bases.len(),
            kappa = kappa_total(bases),
            budget = %num_samples,
            choices = choices.len(),
            partitions = plans.len(),
            subexperiments = buckets.iter().map(Vec::len).sum::<usize>(),
            "generated cutting experiments"
        );
        Ok((buckets, coefficients))
    }

    fn assemble(
        &self,
        plans: &[PartitionPlan<'_>],
        choices: &[JointChoice],
    ) -> Result<Vec<Vec<Circuit>>, KnitError> {
        let build = |rank: usize, choice: &JointChoice| -> Result<(usize, Vec<Vec<Circuit>>), KnitError> {
            let per_plan = plans
                .iter()
                .map(|plan| self.assemble_partition(plan, choice))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rank, per_plan))
        };

        let threads = self.options.parallelism.max(1);
        let built = if threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|err| KnitError::Cutting(ErrorInfo::new("thread-pool", err.to_string())))?;
            pool.install(|| {
                choices
                    .par_iter()
                    .enumerate()
                    .map(|(rank, choice)| build(rank, choice))
                    .collect::<Result<Vec<_>, _>>()
            })?
        } else {
            choices
                .iter()
                .enumerate()
                .map(|(rank, choice)| build(rank, choice))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut arenas: Vec<SlotArena<Circuit>> = plans
            .iter()
            .map(|plan| SlotArena::with_len(choices.len() * plan.outputs_per_choice()))
            .collect();
        for (rank, per_plan) in built {
            for ((arena, plan), circuits) in arenas.iter_mut().zip(plans).zip(per_plan) {
                let width = plan.outputs_per_choice();
                for (offset, circuit) in circuits.into_iter().enumerate() {
                    arena.place(rank * width + offset, circuit)?;
                }
            }
        }
        arenas.into_iter().map(SlotArena::into_vec).collect()
    }

    fn assemble_partition(
        &self,
        plan: &PartitionPlan<'_>,
        choice: &JointChoice,
    ) -> Result<Vec<Circuit>, KnitError> {
        let local = match &plan.slots {
            Some(slots) => choice.restrict(slots)?,
            None => choice.clone(),
        };
        let resolved = self.resolver.resolve(plan.circuit, &plan.positions, &local)?;
        match &plan.groups {
            None => Ok(vec![resolved]),
            Some(groups) => groups
                .iter()
                .map(|group| append_measurement_circuit(&resolved, group, None))
                .collect(),
        }
    }
}

fn label_error<L: Debug>(label: &L) -> KnitError {
    KnitError::Cutting(
        ErrorInfo::new(
            "partition-label-mismatch",
            "circuits and observables must use the same partition labels",
        )
        .with_context("label", format!("{label:?}")),
    )
}

fn check_partition_labels<L>(
    circuits: &IndexMap<L, Circuit>,
    observables: &IndexMap<L, PauliList>,
) -> Result<(), KnitError>
where
    L: Eq + Hash + Debug,
{
    if let Some(label) = circuits.keys().find(|label| !observables.contains_key(*label)) {
        return Err(label_error(label));
    }
    if let Some(label) = observables.keys().find(|label| !circuits.contains_key(*label)) {
        return Err(label_error(label));
    }
    Ok(())
}

/// Generates cutting experiments with the default engine.
pub fn generate_cutting_experiments<L>(
    circuits: &CircuitInput<L>,
    observables: &ObservableInput<L>,
    num_samples: SampleBudget,
) -> Result<(Subexperiments<L>, Vec<Coefficient>), KnitError>
where
    L: Clone + Eq + Hash + Debug + Send + Sync,
{
    CuttingEngine::default().generate_cutting_experiments(circuits, observables, num_samples)
}

/// Generates distribution reconstruction experiments with the default engine.
pub fn generate_distribution_cutting_experiments(
    circuit: &Circuit,
    num_samples: SampleBudget,
) -> Result<(Vec<Circuit>, Vec<Coefficient>), KnitError> {
    CuttingEngine::default().generate_distribution_cutting_experiments(circuit, num_samples)
}
