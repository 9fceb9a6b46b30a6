pub mod endpoints;
pub mod jwt;
