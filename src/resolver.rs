//! # Dependency Resolver
//!
//! The [`Resolver`] owns the descriptor registry and the instance cache. It is
//! populated during a registration phase and then asked for finished components
//! by name.
//!
//! ## Resolution
//!
//! `get(name)` returns the cached instance if there is one. Otherwise it walks the
//! dependency graph depth-first from `name`:
//!
//! 1. Look up the descriptor; a missing one is [`ResolveError::Unregistered`].
//! 2. Push `name` onto the resolution path.
//! 3. For every slot: take the dependency from the cache, or fail with
//!    [`ResolveError::Cycle`] if it is already on the path, or resolve it
//!    recursively. The resolved handle must expose the slot's target type,
//!    otherwise [`ResolveError::TypeMismatch`]. Then the slot is wired.
//! 4. Run the initializer. Errors and panics become
//!    [`ResolveError::Initialization`].
//! 5. Cache the result, pop `name` from the path and return it.
//!
//! Any failure aborts the whole call. Components that finished before the failure
//! stay cached; the failing component and its ancestors are never cached, so a
//! retry after fixing the registration starts clean.
//!
//! ## Concurrency
//!
//! A resolver is a single-threaded object (`Rc` handles, `&mut self` resolution).
//! Embedding code that needs concurrent access must warm every component first
//! and serialize access itself.

use crate::component::{Component, Dependencies, SlotInfo};
use crate::descriptor::ComponentDescriptor;
use crate::error::{ConstructError, RegistrationError, ResolveError};
use crate::handle::ComponentHandle;
use crate::name::ComponentName;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

/// The object-graph resolver.
#[derive(Default)]
pub struct Resolver {
    registry: HashMap<String, ComponentDescriptor>,
    cache: HashMap<String, ComponentHandle>,
}

/// Names currently under construction on the active call stack.
#[derive(Debug, Default)]
struct ResolutionPath {
    stack: Vec<String>,
}

impl ResolutionPath {
    fn enter(&mut self, name: &str) {
        self.stack.push(name.to_string());
    }

    fn leave(&mut self, name: &str) {
        if let Some(pos) = self.stack.iter().rposition(|n| n == name) {
            self.stack.remove(pos);
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.stack.iter().any(|n| n == name)
    }

    /// The current path extended by the name that closes the cycle.
    fn closed_by(&self, name: &str) -> Vec<String> {
        let mut chain = self.stack.clone();
        chain.push(name.to_string());
        chain
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blueprint under its derived name.
    ///
    /// A previous registration under the same name is replaced, unless the name
    /// is type-derived and the previous one came from a different blueprint type.
    /// That case is a [`RegistrationError::NameCollision`]; an explicit
    /// [`Component::NAME`] is how a different type takes over a name on purpose.
    pub fn register<C: Component>(
        &mut self,
        blueprint: C,
    ) -> Result<ComponentName, RegistrationError> {
        self.register_in(&[], blueprint)
    }

    /// Registers a blueprint under `ns1:ns2:Name`.
    pub fn register_in<C: Component>(
        &mut self,
        namespace: &[&str],
        blueprint: C,
    ) -> Result<ComponentName, RegistrationError> {
        let name = ComponentName::qualified(namespace, C::component_name())?;
        if C::NAME.is_none() {
            if let Some(existing) = self.registry.get(name.as_str()) {
                if !existing.is_blueprint::<C>() {
                    warn!(component = %name, existing = existing.type_name(), "Name collision");
                    return Err(RegistrationError::NameCollision {
                        name: name.to_string(),
                        existing: existing.type_name(),
                        registered: std::any::type_name::<C>(),
                    });
                }
            }
        }

        let mut deps = Dependencies::<C>::new();
        C::dependencies(&mut deps);
        let slots = deps.finish()?;

        let descriptor = ComponentDescriptor::new(name.clone(), blueprint, slots);
        let slot_count = descriptor.slots().len();

        if self.cache.contains_key(name.as_str()) {
            warn!(
                component = %name,
                "Re-registered after initialization; cached instance is kept"
            );
        }
        if self
            .registry
            .insert(name.as_str().to_string(), descriptor)
            .is_some()
        {
            debug!(component = %name, "Replaced previous registration");
        }
        debug!(component = %name, slots = slot_count, "Registered");
        Ok(name)
    }

    /// Returns the fully wired singleton for `name`, building it on first use.
    #[instrument(skip(self))]
    pub fn get(&mut self, name: &str) -> Result<ComponentHandle, ResolveError> {
        if let Some(handle) = self.cache.get(name) {
            debug!(component = name, "Cache hit");
            return Ok(handle.clone());
        }
        let mut path = ResolutionPath::default();
        self.resolve(name, &mut path)
    }

    /// Like [`Resolver::get`], viewing the instance as `T`.
    pub fn get_as<T: ?Sized + 'static>(&mut self, name: &str) -> Result<Rc<T>, ResolveError> {
        let handle = self.get(name)?;
        handle.get::<T>().ok_or_else(|| ResolveError::TypeMismatch {
            component: name.to_string(),
            dependency: name.to_string(),
            found: handle.type_name(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Cached instance for `name`, without triggering construction.
    pub fn instance(&self, name: &str) -> Option<ComponentHandle> {
        self.cache.get(name).cloned()
    }

    /// Resolves every registered component, in name order.
    ///
    /// Returns how many components were initialized by this call.
    pub fn warm_up(&mut self) -> Result<usize, ResolveError> {
        let before = self.cache.len();
        for name in self.names() {
            if !self.cache.contains_key(&name) {
                self.get(&name)?;
            }
        }
        Ok(self.cache.len() - before)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.registry.get(name)
    }

    /// Declared dependency names of `name`, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> Option<Vec<&str>> {
        self.registry
            .get(name)
            .map(|d| d.dependency_names().collect())
    }

    /// Registered component names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    fn resolve(
        &mut self,
        name: &str,
        path: &mut ResolutionPath,
    ) -> Result<ComponentHandle, ResolveError> {
        let slots: Vec<SlotInfo> = match self.registry.get(name) {
            Some(descriptor) => descriptor.slots().to_vec(),
            None => {
                warn!(component = name, "Not registered");
                return Err(ResolveError::Unregistered {
                    name: name.to_string(),
                });
            }
        };

        path.enter(name);
        let result = self.build(name, &slots, path);
        path.leave(name);

        let handle = result?;
        self.cache.insert(name.to_string(), handle.clone());
        info!(component = name, slots = slots.len(), "Initialized");
        Ok(handle)
    }

    fn build(
        &mut self,
        name: &str,
        slots: &[SlotInfo],
        path: &mut ResolutionPath,
    ) -> Result<ComponentHandle, ResolveError> {
        for (index, slot) in slots.iter().enumerate() {
            let dependency = &slot.dependency;
            let handle = match self.cache.get(dependency) {
                Some(handle) => handle.clone(),
                None if path.contains(dependency) => {
                    warn!(component = name, %dependency, "Cycle detected");
                    return Err(ResolveError::Cycle {
                        component: name.to_string(),
                        dependency: dependency.clone(),
                        path: path.closed_by(dependency),
                    });
                }
                None => self.resolve(dependency, path)?,
            };

            let descriptor = self.descriptor_mut(name)?;
            let wired = panic::catch_unwind(AssertUnwindSafe(|| {
                descriptor.blueprint_mut().wire(index, &handle)
            }));
            match wired {
                Ok(Ok(())) => debug!(component = name, %dependency, "Wired"),
                Ok(Err(expected)) => {
                    warn!(
                        component = name,
                        %dependency,
                        found = handle.type_name(),
                        expected,
                        "Type mismatch"
                    );
                    return Err(ResolveError::TypeMismatch {
                        component: name.to_string(),
                        dependency: dependency.clone(),
                        found: handle.type_name(),
                        expected,
                    });
                }
                Err(payload) => {
                    let source = ConstructError::Panicked(panic_message(payload.as_ref()));
                    warn!(component = name, %dependency, error = %source, "Slot setter failed");
                    return Err(ResolveError::Initialization {
                        component: name.to_string(),
                        source,
                    });
                }
            }
        }

        let descriptor = self.descriptor_mut(name)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            descriptor.blueprint().construct(descriptor.name())
        }));
        let source = match outcome {
            Ok(Ok(handle)) => return Ok(handle),
            Ok(Err(err)) => err,
            Err(payload) => ConstructError::Panicked(panic_message(payload.as_ref())),
        };
        warn!(component = name, error = %source, "Initializer failed");
        Err(ResolveError::Initialization {
            component: name.to_string(),
            source,
        })
    }

    fn descriptor_mut(&mut self, name: &str) -> Result<&mut ComponentDescriptor, ResolveError> {
        self.registry
            .get_mut(name)
            .ok_or_else(|| ResolveError::Unregistered {
                name: name.to_string(),
            })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
