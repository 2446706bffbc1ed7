use bletchley::{Enigma, Plugboard, Reflector, Rotor};

// input is up to five lines: three rotor specifications, reflector pairs and
// plugboard pairs
fn main() {
    afl::fuzz!(|data: &[u8]| {
        let s = String::from_utf8_lossy(data);
        let lines: Vec<&str> = s.lines().collect();
        if lines.len() < 4 {
            return;
        }

        let Ok(rotors) = lines[..3]
            .iter()
            .map(|spec| Rotor::from_spec(spec, 'B', 'Y'))
            .collect::<Result<Vec<_>, _>>()
        else {
            return;
        };
        let Ok(reflector) = Reflector::new(lines[3]) else {
            return;
        };
        let Ok(plugboard) = Plugboard::new(lines.get(4).copied().unwrap_or("")) else {
            return;
        };
        let Ok(enigma) = Enigma::new(rotors, reflector, plugboard) else {
            return;
        };

        let plaintext = "THEQUICKBROWNFOXJUMPSOVERTHELAZYDOG";
        let ciphertext = enigma.clone().crypt(plaintext);
        assert_eq!(enigma.clone().crypt(&ciphertext), plaintext);
    });
}
