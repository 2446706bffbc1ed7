use criterion::{Criterion, black_box, criterion_group, criterion_main};
use bletchley::presets::{
    SIGABA_INDEX_ROTORS, SIGABA_ROTORS, TYPEX_REFLECTOR, enigma_reflector, enigma_rotor,
    typex_rotor,
};
use bletchley::{
    Enigma, EnigmaSettings, IndexRotor, InputWiring, Keyboard, Plugboard, Reflector, Rotor, Sigaba,
    Typex,
};

const TEXT: &str = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG";

fn enigma() -> Enigma {
    let rotor = |name| Rotor::from_spec(enigma_rotor(name).unwrap(), 'C', 'Q').unwrap();
    Enigma::new(
        vec![rotor("III"), rotor("II"), rotor("I")],
        Reflector::new(enigma_reflector("B").unwrap()).unwrap(),
        Plugboard::new("AB CD EF GH IJ KL MN OP QR ST").unwrap(),
    )
    .unwrap()
}

pub fn machine_benchmarks(c: &mut Criterion) {
    let input = TEXT.repeat(30);

    c.bench_function("enigma 1050 letters", |b| {
        let machine = enigma();
        b.iter(|| machine.clone().crypt(black_box(&input)))
    });

    c.bench_function("typex 1050 letters", |b| {
        let rotors: Vec<Rotor> = (1..=5)
            .map(|i| {
                let spec = typex_rotor(&format!("Example {i}")).unwrap();
                Rotor::from_spec(spec, 'A', 'A').unwrap()
            })
            .collect();
        let machine = Typex::new(
            rotors,
            Reflector::new(TYPEX_REFLECTOR).unwrap(),
            InputWiring::default(),
            Keyboard::None,
        )
        .unwrap();
        b.iter(|| machine.clone().crypt(black_box(&input)))
    });

    c.bench_function("sigaba 1050 letters", |b| {
        let bank = |r: &[&str]| {
            r.iter()
                .map(|w| Rotor::new(w, "", 'A', 'A').unwrap())
                .collect::<Vec<_>>()
        };
        let index = SIGABA_INDEX_ROTORS
            .iter()
            .map(|w| IndexRotor::new(w, '0').unwrap())
            .collect();
        let machine =
            Sigaba::new(bank(&SIGABA_ROTORS[..5]), bank(&SIGABA_ROTORS[5..]), index).unwrap();
        b.iter(|| machine.clone().encrypt(black_box(&input)))
    });
}

pub fn settings_benchmarks(c: &mut Criterion) {
    let settings = EnigmaSettings {
        rotors: ["I", "II", "III"]
            .iter()
            .map(|r| enigma_rotor(r).unwrap().to_string())
            .collect(),
        rings: "AAA".to_string(),
        positions: "ABC".to_string(),
        reflector: enigma_reflector("B").unwrap().to_string(),
        plugboard: "AB CD EF GH IJ KL MN OP QR ST".to_string(),
    };
    let key = settings.serialize().unwrap();

    c.bench_function("settings serialize", |b| {
        b.iter(|| black_box(&settings).serialize().unwrap())
    });
    c.bench_function("settings parse", |b| {
        b.iter(|| black_box(&key).parse::<EnigmaSettings>().unwrap())
    });
}

criterion_group!(benches, machine_benchmarks, settings_benchmarks);
criterion_main!(benches);
