// src/models/mod.rs

pub mod comment;
pub mod fields;
pub mod post;
pub mod response;
pub mod user;
