//! `catfacts` - SMS-controlled CatFacts attack service
//!
//! Admins text a phone number to the service; the coordinator spawns one
//! worker per target that texts it a cat fact on every tick until the facts
//! run out or an admin texts `downboy <number>`.

pub mod cli;
pub mod command;
pub mod config;
pub mod content;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod notifier;
pub mod observability;
pub mod phone;
pub mod worker;
