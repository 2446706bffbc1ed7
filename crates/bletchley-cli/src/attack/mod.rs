pub mod bombe;
pub mod multi;
