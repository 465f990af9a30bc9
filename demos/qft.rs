//! Quantum Fourier Transform (QFT) circuit demo.
//!
//! Builds the n-qubit QFT from H and controlled R_k rotations, runs it on
//! two basis states and checks it against the discrete Fourier transform.

use shor_rs::easybuild::{inverse_qft_circuit, qft_circuit};
use shor_rs::linalg::{is_unitary, norm};
use shor_rs::Register;

fn main() {
    let n = 4;
    println!("=== {}-qubit Quantum Fourier Transform ===\n", n);

    let circuit = qft_circuit(n);
    println!("Circuit: {} gates on {} qubits", circuit.len(), n);
    print!("{}", circuit);

    // QFT|0000⟩ is the uniform superposition
    let mut reg = Register::with_seed(0);
    let q = reg.zeros(n);
    reg.qft(&q);
    let dim = 1usize << n;
    println!("\nQFT|0000⟩ (should be uniform superposition):");
    println!("  Expected amplitude: {:.6}", 1.0 / (dim as f64).sqrt());
    for (i, amp) in reg.amplitudes().iter().take(8).enumerate() {
        println!("    |{:0width$b}⟩: {:.6} + {:.6}i", i, amp.re, amp.im, width = n);
    }

    // QFT|0001⟩ carries the phase progression e^(2πi k/2^n)
    let mut reg1 = Register::with_seed(0);
    let q1 = reg1.zeros(n);
    reg1.x(&[q1[n - 1]]).qft(&q1);
    println!("\nQFT|0001⟩ (should have phase progression):");
    for (i, amp) in reg1.amplitudes().iter().take(8).enumerate() {
        println!(
            "    |{:0width$b}⟩: {:.6} + {:.6}i  (arg/2π={:.4})",
            i,
            amp.re,
            amp.im,
            amp.arg() / (2.0 * std::f64::consts::PI),
            width = n
        );
    }

    println!("\nNorm of QFT|0000⟩: {:.10}", norm(reg.amplitudes()));
    println!("Norm of QFT|0001⟩: {:.10}", norm(reg1.amplitudes()));

    // The inverse undoes the transform
    reg1.inverse_qft(&q1);
    println!("QFT†·QFT|0001⟩ -> |{}⟩", reg1.binary_string(&q1));

    let u = circuit.unitary();
    println!("QFT matrix unitary: {}", is_unitary(&u, 1e-12));
    println!(
        "inverse circuit: {} gates",
        inverse_qft_circuit(n).len()
    );
}
