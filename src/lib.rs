//! RRT: Risk Register Toolkit
//!
//! A Unix-style toolkit for managing a risk register as plain text files
//! under git version control: goals, potential risks, risk causes, control
//! measures, and monitoring sessions with exposure records.

pub mod cli;
pub mod core;
pub mod entities;
pub mod register;
pub mod repo;
pub mod scoring;
pub mod store;
pub mod suggest;
