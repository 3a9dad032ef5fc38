//! Dependency injection core based on field-level annotations and two-phase installation.
//!
//! Components ("goners") are registered in a [Cemetery](cemetery::Cemetery), which wraps each one
//! in a [Coffin](component_registry::Coffin). Installation analyzes the annotated fields of every
//! component, orders the resulting fill/init graph and then populates fields and runs
//! initialization hooks in a safe order.
//!
//! ```
//! use gone_di::cemetery::Cemetery;
//! use gone_di::component_registry::GonerOptions;
//! use gone_di::field::{Inject, InjectVec};
//! use gone_di::instance_provider::ComponentInstancePtr;
//! use gone_di::Goner;
//!
//! #[derive(Goner)]
//! struct Worker;
//!
//! #[derive(Goner)]
//! struct Boss {
//!     #[gone]
//!     workers: InjectVec<ComponentInstancePtr<Worker>>,
//!     #[gone(name = "w1")]
//!     favourite: Inject<ComponentInstancePtr<Worker>>,
//! }
//!
//! let mut cemetery = Cemetery::new();
//! cemetery.register(Worker, GonerOptions::new().name("w1")).unwrap();
//! cemetery.register(Worker, GonerOptions::new().name("w2")).unwrap();
//! let boss = cemetery
//!     .register(
//!         Boss {
//!             workers: Default::default(),
//!             favourite: Default::default(),
//!         },
//!         GonerOptions::new(),
//!     )
//!     .unwrap();
//!
//! cemetery.install().unwrap();
//! assert_eq!(boss.workers.len(), 2);
//! ```
//!
//! ### Features
//!
//! * `derive` - `#[derive(Goner)]` and `#[goner_alias]` support (enabled by default)

extern crate self as gone_di;

pub mod analyzer;
pub mod cemetery;
pub mod component;
pub mod component_registry;
pub mod error;
pub mod field;
pub mod graph;
mod installer;
pub mod instance_provider;
pub mod provider;

#[cfg(feature = "derive")]
pub use gone_di_derive::{goner_alias, Goner};
