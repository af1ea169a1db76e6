// src/models/mod.rs

pub mod attempt;
pub mod content;
pub mod interview;
pub mod question;
pub mod session;
pub mod user;
