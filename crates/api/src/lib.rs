//! HTTP surface: server wiring, the route guard, and the auth endpoints.

pub mod app;
pub mod context;
pub mod guard;
