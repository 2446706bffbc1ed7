//! The Bombe's scramblers and their caches.
//!
//! Every scrambler of a Bombe has its own fast rotor but shares all other
//! rotors and the reflector, which only move once every 26 steps. The
//! [`SharedScrambler`] caches the permutation of the shared part (the lower
//! cache) and the complete permutation for each fast rotor position seen so
//! far (the higher cache). Both caches are valid until the shared rotors
//! move.

use crate::constants::ALPHABET_SIZE;
use crate::pairs::Reflector;
use crate::rotor::Rotor;

const EMPTY: u8 = u8::MAX;

/// The rotors of a Bombe scrambler except the fastest, plus the reflector.
#[derive(Debug, Clone)]
pub struct SharedScrambler {
    rotors: Vec<Rotor>,
    reflector: Reflector,
    lower: [u8; ALPHABET_SIZE],
    higher: [[u8; ALPHABET_SIZE]; ALPHABET_SIZE],
}

impl SharedScrambler {
    /// Create a shared scrambler from rotors ordered fast to slow, excluding
    /// the fastest rotor.
    pub fn new(rotors: Vec<Rotor>, reflector: Reflector) -> Self {
        let mut s = SharedScrambler {
            rotors,
            reflector,
            lower: [EMPTY; ALPHABET_SIZE],
            higher: [[EMPTY; ALPHABET_SIZE]; ALPHABET_SIZE],
        };
        s.cache_gen();
        s
    }

    /// Regenerate the lower cache and clear the higher cache.
    fn cache_gen(&mut self) {
        self.lower = [EMPTY; ALPHABET_SIZE];
        for i in 0..ALPHABET_SIZE as u8 {
            if self.lower[i as usize] != EMPTY {
                continue;
            }
            let mut c = i;
            for rotor in self.rotors.iter() {
                c = rotor.transform(c);
            }
            c = self.reflector.transform(c);
            for rotor in self.rotors.iter().rev() {
                c = rotor.rev_transform(c);
            }
            // the composition is an involution
            self.lower[i as usize] = c;
            self.lower[c as usize] = i;
        }
        self.higher = [[EMPTY; ALPHABET_SIZE]; ALPHABET_SIZE];
    }

    /// Step the shared rotors after a carry into `n` rotors counting the
    /// fast one, i.e., step the first `n - 1` shared rotors.
    pub fn step(&mut self, n: usize) {
        for rotor in self.rotors.iter_mut().take(n.saturating_sub(1)) {
            rotor.step();
        }
        self.cache_gen();
    }

    /// Replace the rotors and reflector.
    pub fn change_rotors(&mut self, rotors: Vec<Rotor>, reflector: Reflector) {
        self.rotors = rotors;
        self.reflector = reflector;
        self.cache_gen();
    }

    /// Move every shared rotor back to position A.
    pub fn reset(&mut self) {
        for rotor in self.rotors.iter_mut() {
            rotor.set_pos(0);
        }
        self.cache_gen();
    }

    /// The number of shared rotors.
    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    /// Returns true if there are no shared rotors.
    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    /// The shared rotors' positions, fast to slow.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = u8> + '_ {
        self.rotors.iter().map(Rotor::pos)
    }
}

/// A scrambler attached to one menu edge.
#[derive(Debug, Clone)]
pub struct Scrambler {
    fast: Rotor,
    offset: u8,
    ends: Option<(u8, u8)>,
}

impl Scrambler {
    /// Create a scrambler with its own copy of the fast rotor, set `offset`
    /// positions past A. The `ends` are the letters of the menu edge, if any.
    pub fn new(mut fast: Rotor, offset: usize, ends: Option<(u8, u8)>) -> Self {
        let offset = (offset % ALPHABET_SIZE) as u8;
        fast.set_pos(offset);
        Scrambler { fast, offset, ends }
    }

    /// Replace the fast rotor, moving it to the scrambler's start position.
    pub fn change_rotor(&mut self, mut fast: Rotor) {
        fast.set_pos(self.offset);
        self.fast = fast;
    }

    /// Move the fast rotor back to the scrambler's start position.
    pub fn reset(&mut self) {
        self.fast.set_pos(self.offset);
    }

    /// Step the fast rotor.
    #[inline]
    pub fn step(&mut self) {
        self.fast.step();
    }

    /// The fast rotor's position.
    pub fn pos(&self) -> u8 {
        self.fast.pos()
    }

    /// The letters at the ends of the menu edge.
    pub fn ends(&self) -> Option<(u8, u8)> {
        self.ends
    }

    /// The letter at the other end of the edge from `c`.
    #[inline]
    pub fn other_end(&self, c: u8) -> u8 {
        match self.ends {
            Some((a, b)) if a == c => b,
            Some((a, _)) => a,
            None => c,
        }
    }

    /// Pass a letter through the whole scrambler, filling the higher cache
    /// on a miss.
    #[inline]
    pub fn transform(&self, shared: &mut SharedScrambler, c: u8) -> u8 {
        let pos = self.fast.pos() as usize;
        let cached = shared.higher[pos][c as usize];
        if cached != EMPTY {
            return cached;
        }
        let out = self
            .fast
            .rev_transform(shared.lower[self.fast.transform(c) as usize]);
        shared.higher[pos][c as usize] = out;
        shared.higher[pos][out as usize] = c;
        out
    }
}
