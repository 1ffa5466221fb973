use std::collections::BTreeSet;

use knit_core::errors::{ErrorInfo, KnitError};
use serde::{Deserialize, Serialize};

use crate::gate::Gate;
use crate::instruction::{ClassicalRegister, Clbit, Instruction, Operation};
use crate::marker::CutMarker;
use crate::serialization::SerializableCircuit;

/// Ordered list of instructions over a fixed number of qubits.
///
/// Every mutation goes through [`Circuit::append`], which checks operand
/// arity and index ranges, so a `Circuit` value is always well formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SerializableCircuit", into = "SerializableCircuit")]
pub struct Circuit {
    num_qubits: usize,
    cregs: Vec<ClassicalRegister>,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Creates an empty circuit over `num_qubits` qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            cregs: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    /// Total number of classical bits over all registers.
    pub fn num_clbits(&self) -> usize {
        self.cregs.iter().map(|reg| reg.size).sum()
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true when the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Looks up a register index by name.
    pub fn register_index(&self, name: &str) -> Option<usize> {
        self.cregs.iter().position(|reg| reg.name == name)
    }

    /// Returns true if any instruction is a measurement.
    pub fn has_measurements(&self) -> bool {
        self.instructions
            .iter()
            .any(|inst| matches!(inst.operation, Operation::Measure))
    }

    /// Iterates over `(position, marker)` for every cut marker.
    pub fn cut_markers(&self) -> impl Iterator<Item = (usize, &CutMarker)> + '_ {
        self.instructions
            .iter()
            .enumerate()
            .filter_map(|(idx, inst)| inst.operation.as_cut().map(|marker| (idx, marker)))
    }

    /// Appends a classical register and returns its index.
    pub fn add_register(&mut self, name: impl Into<String>, size: usize) -> Result<usize, KnitError> {
        let name = name.into();
        if self.register_index(&name).is_some() {
            return Err(KnitError::Circuit(
                ErrorInfo::new("duplicate-register", "register name already in use")
                    .with_context("name", name),
            ));
        }
        self.cregs.push(ClassicalRegister { name, size });
        Ok(self.cregs.len() - 1)
    }

    /// Appends an instruction after validating its operands.
    pub fn append(
        &mut self,
        operation: Operation,
        qubits: Vec<usize>,
        clbits: Vec<Clbit>,
    ) -> Result<(), KnitError> {
        self.validate(&operation, &qubits, &clbits)?;
        self.instructions.push(Instruction {
            operation,
            qubits,
            clbits,
        });
        Ok(())
    }

    /// Appends a gate.
    pub fn gate(&mut self, gate: Gate, qubits: &[usize]) -> Result<(), KnitError> {
        self.append(Operation::Gate { gate }, qubits.to_vec(), Vec::new())
    }

    /// Appends a Hadamard gate.
    pub fn h(&mut self, qubit: usize) -> Result<(), KnitError> {
        self.gate(Gate::H, &[qubit])
    }

    /// Appends an inverse phase gate.
    pub fn sdg(&mut self, qubit: usize) -> Result<(), KnitError> {
        self.gate(Gate::Sdg, &[qubit])
    }

    /// Appends a measurement of `qubit` into `clbit`.
    pub fn measure(&mut self, qubit: usize, clbit: Clbit) -> Result<(), KnitError> {
        self.append(Operation::Measure, vec![qubit], vec![clbit])
    }

    /// Appends a cut marker on the given qubits.
    pub fn cut(&mut self, marker: CutMarker, qubits: &[usize]) -> Result<(), KnitError> {
        self.append(Operation::Cut { marker }, qubits.to_vec(), Vec::new())
    }

    fn validate(
        &self,
        operation: &Operation,
        qubits: &[usize],
        clbits: &[Clbit],
    ) -> Result<(), KnitError> {
        let (expected_qubits, expected_clbits) = match operation {
            Operation::Gate { gate } => (Some(gate.num_qubits()), 0),
            Operation::Measure => (Some(1), 1),
            Operation::Reset => (Some(1), 0),
            Operation::Barrier => (None, 0),
            Operation::Cut { marker } => (Some(marker.num_qubits()), 0),
        };
        if let Some(expected) = expected_qubits {
            if qubits.len() != expected {
                return Err(KnitError::Circuit(
                    ErrorInfo::new("operand-arity", "wrong number of qubit operands")
                        .with_context("operation", operation.name())
                        .with_context("expected", expected)
                        .with_context("found", qubits.len()),
                ));
            }
        }
        if clbits.len() != expected_clbits {
            return Err(KnitError::Circuit(
                ErrorInfo::new("operand-arity", "wrong number of classical operands")
                    .with_context("operation", operation.name())
                    .with_context("expected", expected_clbits)
                    .with_context("found", clbits.len()),
            ));
        }
        let mut seen = BTreeSet::new();
        for &qubit in qubits {
            if qubit >= self.num_qubits {
                return Err(KnitError::Circuit(
                    ErrorInfo::new("qubit-out-of-range", "qubit index outside the circuit")
                        .with_context("qubit", qubit)
                        .with_context("num_qubits", self.num_qubits),
                ));
            }
            if !seen.insert(qubit) {
                return Err(KnitError::Circuit(
                    ErrorInfo::new("duplicate-qubit", "operands must be distinct qubits")
                        .with_context("qubit", qubit),
                ));
            }
        }
        for clbit in clbits {
            let in_range = self
                .cregs
                .get(clbit.register)
                .is_some_and(|reg| clbit.index < reg.size);
            if !in_range {
                return Err(KnitError::Circuit(
                    ErrorInfo::new("clbit-out-of-range", "classical bit outside its register")
                        .with_context("register", clbit.register)
                        .with_context("index", clbit.index),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn from_parts(
        num_qubits: usize,
        cregs: Vec<ClassicalRegister>,
        instructions: Vec<Instruction>,
    ) -> Result<Self, KnitError> {
        let mut circuit = Circuit::new(num_qubits);
        for reg in cregs {
            circuit.add_register(reg.name, reg.size)?;
        }
        for inst in instructions {
            circuit.append(inst.operation, inst.qubits, inst.clbits)?;
        }
        Ok(circuit)
    }

    pub(crate) fn into_parts(self) -> (usize, Vec<ClassicalRegister>, Vec<Instruction>) {
        (self.num_qubits, self.cregs, self.instructions)
    }
}
