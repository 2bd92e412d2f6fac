//! # IO Layer
//!
//! Interfaces exposing the domain to the outside world. Only REST today.

pub mod rest;
