use bletchley::presets::{ENIGMA_ROTORS, enigma_reflector, enigma_rotor};
use bletchley::{Bombe, BombeOptions, Enigma, EnigmaSettings, Error, Steckering, Stop};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_seeder::Seeder;
use rand_xoshiro::Xoshiro256StarStar;

const PLUGBOARD: &str = "AV BS CG DL FU HZ IN KM OW RX";
const PLAINTEXT: &str = "WETTERVORHERSAGEBISKAYA NULLNULLEINS";
const CRIB: &str = "WETTERVORHERSAGEBISK";

fn settings(rotors: &[&str], positions: &str, plugboard: &str) -> EnigmaSettings {
    EnigmaSettings {
        rotors: rotors
            .iter()
            .map(|r| enigma_rotor(r).unwrap().to_string())
            .collect(),
        rings: "A".repeat(rotors.len()),
        positions: positions.to_string(),
        reflector: enigma_reflector("B").unwrap().to_string(),
        plugboard: plugboard.to_string(),
    }
}

/// The letter steckered to `c` by `plugboard`, or `c` itself.
fn partner(plugboard: &str, c: u8) -> u8 {
    let c = (b'A' + c) as char;
    plugboard
        .split_whitespace()
        .find_map(|pair| {
            let mut letters = pair.chars();
            match (letters.next(), letters.next()) {
                (Some(a), Some(b)) if a == c => Some(b),
                (Some(a), Some(b)) if b == c => Some(a),
                _ => None,
            }
        })
        .map_or(c as u8 - b'A', |p| p as u8 - b'A')
}

fn ordered(a: u8, b: u8) -> (u8, u8) {
    (a.min(b), a.max(b))
}

fn ciphertext() -> String {
    Enigma::from_settings(&settings(&["I", "II", "III"], "BCA", PLUGBOARD))
        .unwrap()
        .crypt_strict(PLAINTEXT)
}

fn bombe(ciphertext: &str, options: BombeOptions) -> Bombe {
    Bombe::new(
        &[
            enigma_rotor("III").unwrap(),
            enigma_rotor("II").unwrap(),
            enigma_rotor("I").unwrap(),
        ],
        enigma_reflector("B").unwrap(),
        ciphertext,
        CRIB,
        options,
    )
    .unwrap()
}

#[test_log::test]
fn finds_true_position() {
    let ct = ciphertext();
    assert_eq!(ct, "DOZDR PWXJF UUWLR IEPFB BKCIX RZODM PRFKC");

    let mut b = bombe(&ct, BombeOptions::default());
    assert_eq!(b.loops(), 2);
    let stops = b.run().unwrap();
    assert_eq!(stops.len(), 3);
    let stop = stops.iter().find(|s| s.position == "BCA").unwrap();
    // E is not steckered
    assert_eq!(stop.steckering.to_string(), "EE");
}

#[test_log::test]
fn checking_machine_leaves_only_true_position() {
    let mut b = bombe(
        &ciphertext(),
        BombeOptions {
            check: true,
            ..Default::default()
        },
    );
    let stops = b.run().unwrap();
    assert_eq!(
        stops,
        vec![Stop {
            position: "BCA".to_string(),
            steckering: Steckering::Pairs(vec![
                (1, 18),
                (2, 6),
                (4, 4),
                (5, 20),
                (8, 13),
                (9, 9),
                (10, 12),
                (14, 22),
                (15, 15),
                (17, 23),
            ]),
            decryption: "XELBERAORZERSBGEBISKVBBMPI".to_string(),
        }]
    );
    // every deduced pair is on the real plugboard or an unsteckered letter
    assert_eq!(stops[0].steckering.to_string(), "BS CG EE FU IN JJ KM OW PP RX");
}

#[test_log::test]
fn deduces_true_partner_from_wrong_hypothesis() {
    let mut b = bombe(&ciphertext(), BombeOptions::default());
    let tr = b.menu().test_register();
    let hypothesis = b.menu().hypothesis();
    let true_partner = partner(PLUGBOARD, tr);
    // E is tested against O while E is really unsteckered, so the stop is
    // only found with all wires but the true one live
    assert_eq!((tr, hypothesis), (4, 14));
    assert_ne!(hypothesis, true_partner);

    let stops = b.run().unwrap();
    let stop = stops.iter().find(|s| s.position == "BCA").unwrap();
    assert_eq!(
        stop.steckering,
        Steckering::Pairs(vec![ordered(tr, true_partner)])
    );
}

#[test_log::test]
fn weak_menu_gives_unknown_stops() {
    // no loops, so most positions leave the test register partly live
    let ct = "AXYZGQWERTPLMKONB";
    let mut b = Bombe::new(
        &[
            enigma_rotor("III").unwrap(),
            enigma_rotor("II").unwrap(),
            enigma_rotor("I").unwrap(),
        ],
        enigma_reflector("B").unwrap(),
        ct,
        "BCDEF",
        BombeOptions::default(),
    )
    .unwrap();
    assert_eq!(b.loops(), 0);
    let stops = b.run().unwrap();

    let unknown: Vec<&Stop> = stops
        .iter()
        .filter(|s| matches!(s.steckering, Steckering::Unknown { .. }))
        .collect();
    assert!(!unknown.is_empty());
    for stop in unknown.iter() {
        let Steckering::Unknown { energised } = stop.steckering else {
            unreachable!()
        };
        assert!((2..=24).contains(&energised), "{stop:?}");
        assert!(stop.steckering.to_string().contains(&format!("({energised} live)")));
    }

    // without a deduced pair the trial decryption is an unsteckered Enigma,
    // compared up to the first turnover of rotor III (notch at V)
    let mut compared = 0;
    for stop in unknown.iter() {
        let windows = stop.position.as_bytes();
        if windows[1] == b'E' {
            continue;
        }
        let quiet = (21 - (windows[2] - b'A') as i32).rem_euclid(26) as usize;
        let n = quiet.min(stop.decryption.len());
        if n < 5 {
            continue;
        }
        let expected = Enigma::from_settings(&settings(&["I", "II", "III"], &stop.position, ""))
            .unwrap()
            .crypt(&ct[..n]);
        assert_eq!(stop.decryption[..n], expected, "{stop:?}");
        compared += 1;
    }
    assert!(compared > 0);
}

#[test]
fn crib_offset() {
    let ct = format!("QQQQQ{}", ciphertext());
    let mut b = bombe(
        &ct,
        BombeOptions {
            check: true,
            offset: 5,
        },
    );
    let stops = b.run().unwrap();
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0].position, "BCA");
}

#[test]
fn crib_validation() {
    let ct = ciphertext();
    let new = |crib: &str| {
        Bombe::new(
            &[
                enigma_rotor("III").unwrap(),
                enigma_rotor("II").unwrap(),
                enigma_rotor("I").unwrap(),
            ],
            enigma_reflector("B").unwrap(),
            &ct,
            crib,
            BombeOptions::default(),
        )
    };
    // too short
    assert!(matches!(new("W"), Err(Error::Crib(_))));
    // D under D at the start
    assert!(matches!(new("DETTE"), Err(Error::Crib(_))));
    // too long
    assert!(matches!(new("WETTERVORHERSAGEBISKAYANUL"), Err(Error::Crib(_))));
    // longer than the ciphertext
    assert!(matches!(
        Bombe::new(
            &[
                enigma_rotor("III").unwrap(),
                enigma_rotor("II").unwrap(),
                enigma_rotor("I").unwrap(),
            ],
            enigma_reflector("B").unwrap(),
            "DOZDR",
            CRIB,
            BombeOptions::default(),
        ),
        Err(Error::Crib(_))
    ));
    assert!(new(CRIB).is_ok());
}

/// A window for the fast rotor such that neither it nor the middle rotor
/// turns over within `len` letters.
fn quiet_positions(rng: &mut impl Rng, fast: &str, middle: &str, len: usize) -> (char, char) {
    let notch = |spec: &str| spec.split_once('<').unwrap().1.as_bytes()[0] - b'A';
    loop {
        let f = rng.random_range(0..26u8);
        let m = rng.random_range(0..26u8);
        let fast_turns = (1..=len as u8).any(|k| (f + k) % 26 == notch(fast));
        let middle_turns = (m + 1) % 26 == notch(middle);
        if !fast_turns && !middle_turns {
            return ((b'A' + f) as char, (b'A' + m) as char);
        }
    }
}

#[test]
fn finds_random_settings() {
    let mut rng: Xoshiro256StarStar = Seeder::from("bombe").into_rng();
    let letters: Vec<char> = ('A'..='Z').collect();

    for _ in 0..4 {
        // three of rotors I to V, which have a single notch each
        let mut names: Vec<&str> = ENIGMA_ROTORS[..5].iter().map(|(n, _)| *n).collect();
        names.shuffle(&mut rng);
        let names = &names[..3];
        let specs: Vec<&str> = names.iter().map(|n| enigma_rotor(n).unwrap()).collect();

        let crib_len = rng.random_range(14..=25);
        let (fast, middle) = quiet_positions(&mut rng, specs[2], specs[1], crib_len);
        let slow = letters[rng.random_range(0..26)];
        let positions: String = [slow, middle, fast].iter().collect();

        let mut shuffled = letters.clone();
        shuffled.shuffle(&mut rng);
        let n_pairs = rng.random_range(0..=10);
        let plugboard: Vec<String> = shuffled
            .chunks(2)
            .take(n_pairs)
            .map(|p| p.iter().collect())
            .collect();

        let plaintext: String = (0..40).map(|_| letters[rng.random_range(0..26)]).collect();
        let s = settings(names, &positions, &plugboard.join(" "));
        let ct = Enigma::from_settings(&s).unwrap().crypt(&plaintext);

        let mut b = Bombe::new(
            &[specs[2], specs[1], specs[0]],
            enigma_reflector("B").unwrap(),
            &ct,
            &plaintext[..crib_len],
            BombeOptions::default(),
        )
        .unwrap();
        let stops = b.run().unwrap();
        let Some(stop) = stops.iter().find(|s| s.position == positions) else {
            panic!("{s:?} not found among {} stops", stops.len());
        };
        // a pair read off from the one dead wire is the real stecker, the
        // only other pair is the hypothesis with a single live wire
        let tr = b.menu().test_register();
        let true_pair = vec![ordered(tr, partner(&s.plugboard, tr))];
        let hypothesis_pair = vec![ordered(tr, b.menu().hypothesis())];
        if let Steckering::Pairs(pairs) = &stop.steckering {
            assert!(pairs == &true_pair || pairs == &hypothesis_pair, "{s:?} {pairs:?}");
        }
    }
}

#[test]
fn change_rotors_matches_new_bombe() {
    let ct = ciphertext();
    let mut b = bombe(&ct, BombeOptions::default());
    let wrong = b.run().unwrap();
    let rotors = [
        enigma_rotor("II").unwrap(),
        enigma_rotor("III").unwrap(),
        enigma_rotor("I").unwrap(),
    ];
    b.change_rotors(&rotors, enigma_reflector("B").unwrap()).unwrap();
    let changed = b.run().unwrap();

    let mut fresh = Bombe::new(
        &rotors,
        enigma_reflector("B").unwrap(),
        &ct,
        CRIB,
        BombeOptions::default(),
    )
    .unwrap();
    assert_eq!(changed, fresh.run().unwrap());
    assert_ne!(changed, wrong);
}
