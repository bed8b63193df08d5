//! Core symbol layer
//! Contains the type identity model, template substitution and symbol factories

pub mod type_system;
