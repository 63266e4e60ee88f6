// src/utils/mod.rs

pub mod key;
