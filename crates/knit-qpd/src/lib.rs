#![deny(missing_docs)]
#![doc = "Quasi-probability weight sampling and cut marker resolution for knit circuits."]

/// Cut marker resolution into concrete local operations.
pub mod decompose;
/// Joint choice sampling from products of QPD bases.
pub mod weights;

pub use decompose::{
    decompose_qpd_instructions, CircuitResolver, QpdResolver, QPD_MEASUREMENT_REGISTER,
};
pub use weights::{
    generate_qpd_weights, JointChoice, QpdWeightSampler, SampleSet, SampleWeight, WeightSampler,
    WeightType,
};
