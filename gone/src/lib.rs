//! Application framework based on [gone_di] dependency injection.
//!
//! Traditional applications start in the `main()` function and often explicitly initialize and pass
//! around various domain/application services or other components. With dependency injection in
//! place, all application components can become decoupled and form a dependency graph managed by a
//! DI framework. This, in turn, requires an entrypoint for the application which installs the
//! components and runs the actual business logic of the application. This crate provides such
//! entrypoint in the form of [Application](application::Application), which also configures
//! supporting infrastructure: logging, configuration and [Daemon](gone_di::component::Daemon)
//! lifecycle.

pub mod application;
pub mod config;
pub mod daemon;
pub mod logger;
pub mod runner;
