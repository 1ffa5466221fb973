use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use knit_circuit::{Circuit, CutMarker, Gate, LocalOp, QpdBasis};
use knit_core::SampleBudget;
use knit_cutting::{CircuitInput, CuttingEngine, CuttingOptions, ObservableInput};
use knit_obs::PauliList;

fn ladder_circuit(num_qubits: usize) -> Circuit {
    let basis = Arc::new(
        QpdBasis::new(
            vec![
                vec![vec![], vec![]],
                vec![vec![LocalOp::gate(Gate::Z)], vec![LocalOp::gate(Gate::Z)]],
                vec![vec![LocalOp::Measure], vec![LocalOp::gate(Gate::Sdg)]],
                vec![vec![LocalOp::gate(Gate::Sdg)], vec![LocalOp::Measure]],
            ],
            vec![0.5, 0.5, -0.5, 0.5],
        )
        .unwrap(),
    );
    let mut circuit = Circuit::new(num_qubits);
    for qubit in 0..num_qubits {
        circuit.h(qubit).unwrap();
    }
    for qubit in 0..num_qubits - 1 {
        circuit
            .cut(CutMarker::two_party(basis.clone()).unwrap(), &[qubit, qubit + 1])
            .unwrap();
    }
    circuit
}

fn generate_bench(c: &mut Criterion) {
    let circuits = CircuitInput::<String>::Unified(ladder_circuit(8));
    let observables = ObservableInput::Unified(
        PauliList::from_labels(["ZZZZZZZZ", "XXXXXXXX", "YIYIYIYI"]).unwrap(),
    );
    let sequential = CuttingEngine::new(CuttingOptions::default());
    let parallel = CuttingEngine::new(CuttingOptions::default().with_parallelism(4));

    c.bench_function("generate_1k_samples", |b| {
        b.iter(|| {
            let out = sequential
                .generate_cutting_experiments(&circuits, &observables, SampleBudget::Finite(1_000))
                .unwrap();
            black_box(out);
        });
    });
    c.bench_function("generate_1k_samples_parallel", |b| {
        b.iter(|| {
            let out = parallel
                .generate_cutting_experiments(&circuits, &observables, SampleBudget::Finite(1_000))
                .unwrap();
            black_box(out);
        });
    });
}

criterion_group!(benches, generate_bench);
criterion_main!(benches);
