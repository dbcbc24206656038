//! Core engine of the time-tracking application: the time-entry lifecycle
//! (single active timer per user, duration computation, manual entries),
//! role-based authorization with manager delegation, authorized query
//! scoping for listings, and the report aggregations built on top.
//!
//! Transport, schema validation, and session handling live in the calling
//! application; this crate exposes services over repository traits.

pub mod auth;
pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
