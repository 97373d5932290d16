//! HTTP request / response bodies.

pub mod chat;
pub mod persona;
