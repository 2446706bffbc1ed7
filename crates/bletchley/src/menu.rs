//! The Bombe menu: a graph with one node per letter and one edge per crib
//! position, joining the plaintext and ciphertext letters at that position.
//!
//! The Bombe only wires up the best connected component of the graph. Every
//! loop in it is a constraint that rejects wrong rotor positions, so the
//! component with the most loops is chosen.

use std::cmp::Reverse;

use log::debug;

use crate::Error;
use crate::constants::{ALPHABET_SIZE, MAX_CRIB_LEN, MIN_CRIB_LEN};
use crate::letter::letter;

/// A menu edge: at crib offset `offset` the machine maps `ends.0` to `ends.1`
/// (and back).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEdge {
    pub offset: usize,
    pub ends: (u8, u8),
}

impl MenuEdge {
    /// The letter at the other end of the edge from `c`.
    #[inline]
    pub fn other(&self, c: u8) -> u8 {
        if self.ends.0 == c { self.ends.1 } else { self.ends.0 }
    }
}

#[derive(Debug, Default)]
struct Node {
    edges: Vec<usize>,
    visited: bool,
}

/// A connected component found by the traversal.
#[derive(Debug)]
struct Component {
    loops: usize,
    nodes: usize,
    most_connected: u8,
    edges: Vec<usize>,
}

/// The chosen component of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    edges: Vec<MenuEdge>,
    loops: usize,
    nodes: usize,
    test_register: u8,
    hypothesis: u8,
}

impl Menu {
    /// Build the menu for a crib placed at the start of `ciphertext`, both as
    /// alphabet indexes.
    ///
    /// Returns an error if the crib is too short or too long, runs past the
    /// end of the ciphertext, or has the same letter as the ciphertext at any
    /// position.
    pub fn new(ciphertext: &[u8], crib: &[u8]) -> Result<Self, Error> {
        if crib.len() < MIN_CRIB_LEN {
            Err(Error::Crib(format!(
                "crib must be at least {MIN_CRIB_LEN} letters, got {}",
                crib.len()
            )))?;
        }
        if crib.len() > MAX_CRIB_LEN {
            Err(Error::Crib(format!(
                "crib must be at most {MAX_CRIB_LEN} letters, got {}",
                crib.len()
            )))?;
        }
        if crib.len() > ciphertext.len() {
            Err(Error::Crib(format!(
                "crib overruns ciphertext, {} > {} letters",
                crib.len(),
                ciphertext.len()
            )))?;
        }
        if let Some(i) = (0..crib.len()).find(|&i| crib[i] == ciphertext[i]) {
            Err(Error::Crib(format!(
                "crib and ciphertext are both {} at position {i}, an Enigma never encrypts a letter to itself",
                letter(crib[i])
            )))?;
        }

        let edges: Vec<MenuEdge> = crib
            .iter()
            .zip(ciphertext)
            .enumerate()
            .map(|(offset, (&p, &c))| MenuEdge {
                offset,
                ends: (p, c),
            })
            .collect();
        let mut nodes: Vec<Node> = (0..ALPHABET_SIZE).map(|_| Node::default()).collect();
        for (i, edge) in edges.iter().enumerate() {
            nodes[edge.ends.0 as usize].edges.push(i);
            nodes[edge.ends.1 as usize].edges.push(i);
        }

        // nodes are explored in the order their letters first appear in the
        // ciphertext and then the crib
        let mut order = Vec::with_capacity(ALPHABET_SIZE);
        for &c in ciphertext[..crib.len()].iter().chain(crib) {
            if !order.contains(&c) {
                order.push(c);
            }
        }

        let mut edge_visited = vec![false; edges.len()];
        let mut components = Vec::new();
        for c in order {
            if !nodes[c as usize].visited {
                components.push(explore(&mut nodes, &edges, &mut edge_visited, c));
            }
        }

        // most loops, then most nodes, then first found
        let Some(best) = components
            .into_iter()
            .min_by_key(|c| (Reverse(c.loops), Reverse(c.nodes)))
        else {
            return Err(Error::Crib("empty menu".to_string()));
        };

        let test_register = best.most_connected;
        let first = edges[nodes[test_register as usize].edges[0]];
        let menu = Menu {
            edges: best.edges.iter().map(|&e| edges[e]).collect(),
            loops: best.loops,
            nodes: best.nodes,
            test_register,
            hypothesis: first.other(test_register),
        };
        debug!(
            "menu: {} nodes, {} edges, {} loops, testing {} against {}",
            menu.nodes,
            menu.edges.len(),
            menu.loops,
            letter(menu.test_register),
            letter(menu.hypothesis)
        );
        Ok(menu)
    }

    /// The edges of the chosen component, in discovery order.
    pub fn edges(&self) -> &[MenuEdge] {
        &self.edges
    }

    /// The number of loops in the chosen component.
    pub fn loops(&self) -> usize {
        self.loops
    }

    /// The number of letters in the chosen component.
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// The letter whose wires are watched for a stop: the most connected
    /// letter of the chosen component.
    pub fn test_register(&self) -> u8 {
        self.test_register
    }

    /// The letter first assumed to be steckered to the test register.
    pub fn hypothesis(&self) -> u8 {
        self.hypothesis
    }
}

/// Depth-first traversal of the component containing `start`, with an
/// explicit stack of (node, next edge) pairs.
fn explore(
    nodes: &mut [Node],
    edges: &[MenuEdge],
    edge_visited: &mut [bool],
    start: u8,
) -> Component {
    let mut component = Component {
        loops: 0,
        nodes: 1,
        most_connected: start,
        edges: Vec::new(),
    };
    nodes[start as usize].visited = true;
    let mut stack = vec![(start, 0)];

    while let Some(top) = stack.last_mut() {
        let (node, next) = *top;
        let Some(&e) = nodes[node as usize].edges.get(next) else {
            stack.pop();
            continue;
        };
        top.1 += 1;
        if edge_visited[e] {
            continue;
        }
        edge_visited[e] = true;
        component.edges.push(e);

        let other = edges[e].other(node);
        if nodes[other as usize].visited {
            component.loops += 1;
            continue;
        }
        nodes[other as usize].visited = true;
        component.nodes += 1;
        let degree = |c: u8| nodes[c as usize].edges.len();
        if degree(other) > degree(component.most_connected) {
            component.most_connected = other;
        }
        stack.push((other, 0));
    }
    component
}
