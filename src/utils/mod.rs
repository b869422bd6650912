pub mod hash;
pub mod html;
pub mod image;
pub mod jwt;
