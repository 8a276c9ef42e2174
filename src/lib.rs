//! uiforge — multi-agent front-end scaffolder.
//!
//! A planner model turns a UI description into a build plan; a coordinator
//! clones a Vite+React template, then drives dependency-install and
//! component-writing agents through a FIFO task queue and finally starts
//! the dev server for preview.

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod inference;
pub mod tools;
pub mod types;
