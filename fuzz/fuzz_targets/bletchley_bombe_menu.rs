use bletchley::menu::Menu;

// input is a ciphertext and a crib separated by '|'
fn main() {
    afl::fuzz!(|data: &[u8]| {
        let letters = |b: &[u8]| -> Vec<u8> {
            b.iter()
                .filter(|c| c.is_ascii_uppercase())
                .map(|c| c - b'A')
                .collect()
        };
        let Some(split) = data.iter().position(|&b| b == b'|') else {
            return;
        };
        let ciphertext = letters(&data[..split]);
        let crib = letters(&data[split + 1..]);

        let Ok(menu) = Menu::new(&ciphertext, &crib) else {
            return;
        };
        assert!(menu.edges().len() <= crib.len());
        assert!(menu.nodes() <= menu.edges().len() + 1);
        assert!(menu.edges().iter().any(|e| {
            e.ends.0 == menu.test_register() || e.ends.1 == menu.test_register()
        }));
    });
}
