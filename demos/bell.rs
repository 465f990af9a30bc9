//! Bell pair preparation and correlated measurement.

use shor_rs::density::DensityMatrix;
use shor_rs::operator::{Op, OperatorString};
use shor_rs::Register;

fn main() {
    let mut reg = Register::with_seed(7);
    let q = reg.zeros(2);
    reg.h(&[q[0]]).cnot(q[0], q[1]);

    println!("Bell state:");
    for s in reg.states(&[]) {
        println!("  {}", s);
    }

    let zz = OperatorString::new(vec![(0, Op::Z), (1, Op::Z)]);
    match reg.expectation(&zz.matrix(2)) {
        Ok(v) => println!("⟨{}⟩ = {:.4}", zz, v),
        Err(e) => println!("⟨{}⟩ failed: {}", zz, e),
    }

    let reduced = DensityMatrix::pure(reg.amplitudes()).partial_trace(1);
    println!("purity of qubit 0: {:.4}", reduced.squared_trace().re);

    for shot in 0..5 {
        let mut copy = reg.clone();
        copy.reseed(shot);
        println!("shot {}: {}", shot, copy.binary_string(&q));
    }
}
