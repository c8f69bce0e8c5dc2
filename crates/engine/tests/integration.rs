#![allow(unused_crate_dependencies)]

#[path = "integration/common/mod.rs"]
mod common;

#[path = "integration/teh_quick_fox.rs"]
mod teh_quick_fox;

#[path = "integration/mutation_fallback.rs"]
mod mutation_fallback;
