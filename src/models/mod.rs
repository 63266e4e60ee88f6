// src/models/mod.rs

pub mod attempt;
pub mod explanation;
pub mod question;
pub mod submission;
