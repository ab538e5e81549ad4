//! # Component Graph
//!
//! > **A singleton object-graph resolver for Rust.**
//!
//! Register component blueprints that declare their dependencies by name, then ask
//! for any component by name. The resolver builds the transitive graph leaf-first,
//! calls each component's initializer exactly once, caches the result for the
//! lifetime of the resolver and reports cycles instead of overflowing the stack.
//!
//! ## Core Concepts
//!
//! ### Blueprints and Instances
//! A blueprint is a template value implementing [`Component`]. The resolver fills
//! its declared dependency slots and then calls [`Component::construct`], which
//! returns the actual instance. Only the instance is cached and shared.
//!
//! ### Names
//! A component's name is its type identity (`LowLevel`), an explicit tag
//! ([`Component::NAME`]), or either of those behind a namespace prefix
//! (`ns1:ns2:LowLevel`, see [`Resolver::register_in`]). The same string is the
//! cache key and the value a dependent slot refers to.
//!
//! ### Capabilities
//! A slot asks for `Rc<T>`, where `T` is either a concrete instance type or a
//! trait object. A resolved dependency is assignable when its component exposed a
//! view of `T` in [`Component::expose`]. Anything else is a
//! [`ResolveError::TypeMismatch`].
//!
//! ## Module Tour
//!
//! - [`component`]: the [`Component`] contract, [`Dependencies`] builder, [`Dep`] slot holder.
//! - [`descriptor`]: the [`ComponentDescriptor`] stored per registration.
//! - [`handle`]: [`ComponentHandle`], the cached instance and its [`Views`].
//! - [`name`]: [`ComponentName`] derivation.
//! - [`resolver`]: the [`Resolver`] itself.
//! - [`error`]: [`RegistrationError`], [`ResolveError`], [`ConstructError`].
//! - [`tracing`]: subscriber setup.
//!
//! ## Quick Start
//!
//! ```rust
//! use component_graph::{Component, ConstructError, Resolver};
//!
//! struct Greeting;
//!
//! impl Component for Greeting {
//!     type Instance = String;
//!
//!     fn construct(&self) -> Result<String, ConstructError> {
//!         Ok("hello".to_string())
//!     }
//! }
//!
//! let mut resolver = Resolver::new();
//! resolver.register(Greeting).unwrap();
//! let greeting = resolver.get_as::<String>("Greeting").unwrap();
//! assert_eq!(greeting.as_str(), "hello");
//! ```

pub mod component;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod name;
pub mod resolver;
pub mod tracing;

pub use component::{Component, Dep, Dependencies, SlotInfo};
pub use descriptor::ComponentDescriptor;
pub use error::{ConstructError, RegistrationError, ResolveError};
pub use handle::{ComponentHandle, Views};
pub use name::ComponentName;
pub use resolver::Resolver;
