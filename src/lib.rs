//! Guided Consult - a guided wellness interview assistant.
//!
//! A visitor describes a complaint, the assistant asks one follow-up
//! question per turn, and the interview ends with a structured report
//! that can be downloaded as Markdown.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
