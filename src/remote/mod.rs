//! Hosted remote store
//!
//! `RestRepository` talks to a PostgREST endpoint (the hosted database the
//! web client uses) and implements the same persistence traits as the local
//! SQLite store.

mod rest;

pub use rest::RestRepository;
