use criterion::{Criterion, black_box, criterion_group, criterion_main};
use bletchley::presets::{enigma_reflector, enigma_rotor};
use bletchley::{Bombe, BombeOptions, Enigma, MultiBombe, Plugboard, Reflector, Rotor};

const PLAINTEXT: &str = "WETTERVORHERSAGEBISKAYA";

fn ciphertext() -> String {
    let rotor = |name, pos| Rotor::from_spec(enigma_rotor(name).unwrap(), 'A', pos).unwrap();
    Enigma::new(
        vec![rotor("III", 'C'), rotor("II", 'B'), rotor("I", 'A')],
        Reflector::new(enigma_reflector("B").unwrap()).unwrap(),
        Plugboard::new("AV BS CG DL FU HZ IN KM OW RX").unwrap(),
    )
    .unwrap()
    .crypt(PLAINTEXT)
}

pub fn bombe_benchmarks(c: &mut Criterion) {
    let ct = ciphertext();
    let rotors = [
        enigma_rotor("III").unwrap(),
        enigma_rotor("II").unwrap(),
        enigma_rotor("I").unwrap(),
    ];
    let reflector = enigma_reflector("B").unwrap();

    let mut group = c.benchmark_group("bombe");
    group.sample_size(10);

    group.bench_function("full run, 3 rotors", |b| {
        let mut bombe =
            Bombe::new(&rotors, reflector, &ct, PLAINTEXT, BombeOptions::default()).unwrap();
        b.iter(|| black_box(bombe.run().unwrap()))
    });

    group.bench_function("full run, 3 rotors, checking machine", |b| {
        let options = BombeOptions {
            check: true,
            ..Default::default()
        };
        let mut bombe = Bombe::new(&rotors, reflector, &ct, PLAINTEXT, options).unwrap();
        b.iter(|| black_box(bombe.run().unwrap()))
    });

    group.bench_function("multi, 3 rotors, 6 orders", |b| {
        let names: Vec<String> = ["I", "II", "III"].iter().map(|s| s.to_string()).collect();
        let multi = MultiBombe::new(
            &names,
            &[],
            &["B".to_string()],
            &ct,
            PLAINTEXT,
            BombeOptions::default(),
        )
        .unwrap();
        b.iter(|| black_box(multi.run().unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bombe_benchmarks);
criterion_main!(benches);
