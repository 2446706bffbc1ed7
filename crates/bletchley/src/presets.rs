//! Named rotor and reflector wirings.
//!
//! The Enigma wirings are the historical ones. The Typex and SIGABA wirings
//! are examples only, the real ones were never published.

/// Enigma rotors as `(name, "<wiring><<steps>")`.
pub const ENIGMA_ROTORS: [(&str, &str); 8] = [
    ("I", "EKMFLGDQVZNTOWYHXUSPAIBRCJ<R"),
    ("II", "AJDKSIRUXBLHWTMCQGZNPYFVOE<F"),
    ("III", "BDFHJLCPRTXVZNYEIWGAKMUSQO<W"),
    ("IV", "ESOVPZJAYQUIRHXLNFTGKDCMWB<K"),
    ("V", "VZBRGITYUPSDNHLXAWMJQOFECK<A"),
    ("VI", "JPGVOUMFYQBENHZRDKASXLICTW<AN"),
    ("VII", "NZJHGRCXMYSWBOUFAIVLPEKQDT<AN"),
    ("VIII", "FKQHTLXOCBJSPDZRAMEWNIUYGV<AN"),
];

/// The fourth (non-stepping) rotors of the M4, used with thin reflectors.
pub const ENIGMA_FOURTH_ROTORS: [(&str, &str); 2] = [
    ("Beta", "LEYJVCNIXWPBQMDRTAKZGFUHOS"),
    ("Gamma", "FSOKANUERHMBTIYCWLQPZXVGJD"),
];

/// Enigma reflectors as `(name, pairs)`.
pub const ENIGMA_REFLECTORS: [(&str, &str); 4] = [
    ("B", "AY BR CU DH EQ FS GL IP JX KN MO TZ VW"),
    ("C", "AF BV CP DJ EI GO HY KR LZ MX NW QT SU"),
    ("B Thin", "AE BN CK DQ FU GY HW IJ LO MP RX SZ TV"),
    ("C Thin", "AR BD CO EJ FN GT HK IV LM PW QZ SX UY"),
];

/// Example Typex rotors.
pub const TYPEX_ROTORS: [(&str, &str); 8] = [
    ("Example 1", "MCYLPQUVRXGSAOWNBJEZDTFKHI<BFHNQUW"),
    ("Example 2", "KHWENRCBISXJQGOFMAPVYZDLTU<BFHNQUW"),
    ("Example 3", "BYPDZMGIKQCUSATREHOJNLFWXV<BFHNQUW"),
    ("Example 4", "ZANJCGDLVHIXOBRPMSWQUKFYET<BFHNQUW"),
    ("Example 5", "QXBGUTOVFCZPJIHSWERYNDAMLK<BFHNQUW"),
    ("Example 6", "BDCNWUEIQVFTSXALOGZJYMHKPR<BFHNQUW"),
    ("Example 7", "WJUKEIABMSGFTQZVCNPHORDXYL<BFHNQUW"),
    ("Example 8", "TNVCZXDIPFWQKHSJMAOYLEURGB<BFHNQUW"),
];

/// Example Typex reflector.
pub const TYPEX_REFLECTOR: &str = "AN BC FG IE KD LU MH OR TS VZ WQ XJ YP";

/// Example SIGABA cipher and control rotors.
pub const SIGABA_ROTORS: [&str; 10] = [
    "SRGWANHPJZFXVIDQCEUKBYOLMT",
    "THQEFSAZVKJYULBODCPXNIMWRG",
    "XDTUYLEVFNQZBPOGIRCSMHWKAJ",
    "LOHDMCWUPSTNGVXYFJREQIKBZA",
    "ERXWNZQIJYLVOFUMSGHTCKPBDA",
    "FQECYHJIOUMDZVPSLKRTGWXBAN",
    "TBYIUMKZDJSOPEWXVANHLCFQGR",
    "QZUPDTFNYIAOMLEBWJXCGHKRSV",
    "CZWNHEMPOVXLKRSIDGJFYBTQAU",
    "ENPXJVKYQBFZTICAGMOHWDRSLU",
];

/// Example SIGABA index rotors.
pub const SIGABA_INDEX_ROTORS: [&str; 5] = [
    "6201348957",
    "6147253089",
    "8239647510",
    "7194835260",
    "4873205916",
];

fn lookup(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, spec)| *spec)
}

/// Look up an Enigma rotor (including Beta and Gamma) by name.
pub fn enigma_rotor(name: &str) -> Option<&'static str> {
    lookup(&ENIGMA_ROTORS, name).or_else(|| lookup(&ENIGMA_FOURTH_ROTORS, name))
}

/// Look up an Enigma reflector by name.
pub fn enigma_reflector(name: &str) -> Option<&'static str> {
    lookup(&ENIGMA_REFLECTORS, name)
}

/// Look up a Typex rotor by name.
pub fn typex_rotor(name: &str) -> Option<&'static str> {
    lookup(&TYPEX_ROTORS, name)
}

/// Resolve a rotor argument: a known name (Enigma or Typex) or a literal
/// specification string.
pub fn resolve_rotor(arg: &str) -> &str {
    enigma_rotor(arg).or_else(|| typex_rotor(arg)).unwrap_or(arg)
}

/// Resolve a reflector argument: a known Enigma name or literal pairs.
pub fn resolve_reflector(arg: &str) -> &str {
    enigma_reflector(arg).unwrap_or(arg)
}
