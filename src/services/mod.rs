// src/services/mod.rs

pub mod grading;
pub mod interview;
pub mod judge;
pub mod oracle;
