//! Job application tracker server library.
//!
//! Accounts and sessions, job applications with their status pipeline,
//! uploaded documents backed by object storage, a per-user profile and
//! analytics over a user's applications.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
