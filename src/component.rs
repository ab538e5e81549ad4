//! # Component Trait
//!
//! The `Component` trait is the contract every blueprint type implements to be
//! managed by the [`Resolver`](crate::Resolver). It replaces runtime field
//! introspection with a static declaration: the type lists its dependency slots
//! in [`Component::dependencies`], the capabilities its instance can be viewed as
//! in [`Component::expose`], and its designated initializer in
//! [`Component::construct`].
//!
//! # Dependency Slots
//! A slot is a field of the blueprint that the resolver fills before calling the
//! initializer. Slots come in two shapes:
//! - **Named**: [`Dependencies::named`] wires the field from the component
//!   registered under an exact name.
//! - **Typed**: [`Dependencies::typed`] derives the name from the dependency's
//!   own component type.
//!
//! Fields that are not declared are left untouched.
//!
//! # Blueprint vs Instance
//! The blueprint is only a template. `construct` reads the wired blueprint and
//! returns a separate `Instance`, which is what gets cached and shared.

use crate::error::{ConstructError, RegistrationError};
use crate::handle::{ComponentHandle, Views};
use crate::name::type_identity;
use std::fmt;
use std::rc::Rc;

/// Trait that any blueprint must implement to be registered with a resolver.
///
/// ```rust
/// use component_graph::{Component, ConstructError, Dep, Dependencies, Resolver, Views};
/// use std::rc::Rc;
///
/// trait Counter {
///     fn counter(&self) -> u32;
/// }
///
/// struct LowLevel {
///     counter: u32,
/// }
///
/// impl Counter for LowLevel {
///     fn counter(&self) -> u32 {
///         self.counter
///     }
/// }
///
/// impl Component for LowLevel {
///     type Instance = LowLevel;
///
///     fn expose(views: &mut Views<LowLevel>) {
///         views.provide::<dyn Counter>(|low| low);
///     }
///
///     fn construct(&self) -> Result<LowLevel, ConstructError> {
///         Ok(LowLevel { counter: self.counter })
///     }
/// }
///
/// #[derive(Default)]
/// struct TopLevel {
///     low: Dep<dyn Counter>,
/// }
///
/// impl Component for TopLevel {
///     type Instance = TopLevel;
///
///     fn dependencies(deps: &mut Dependencies<Self>) {
///         deps.named::<dyn Counter>("LowLevel", |top, low| top.low.fill(low));
///     }
///
///     fn construct(&self) -> Result<TopLevel, ConstructError> {
///         Ok(TopLevel { low: self.low.clone() })
///     }
/// }
///
/// let mut resolver = Resolver::new();
/// resolver.register(LowLevel { counter: 12 }).unwrap();
/// resolver.register(TopLevel::default()).unwrap();
///
/// let top = resolver.get_as::<TopLevel>("TopLevel").unwrap();
/// assert_eq!(top.low.get().unwrap().counter(), 12);
/// ```
pub trait Component: Sized + 'static {
    /// The value produced by the initializer and stored in the instance cache.
    type Instance: 'static;

    /// Explicit tag overriding the type-derived component name.
    const NAME: Option<&'static str> = None;

    /// Declares the dependency slots of this blueprint.
    ///
    /// The default declares none; such a leaf component is still registered and
    /// cached like any other.
    fn dependencies(_deps: &mut Dependencies<Self>) {}

    /// Declares the capabilities (`Rc<dyn Trait>`) the finished instance can be
    /// viewed as, on top of its concrete type.
    fn expose(_views: &mut Views<Self::Instance>) {}

    /// The designated initializer, invoked once after every slot is wired.
    fn construct(&self) -> Result<Self::Instance, ConstructError>;

    /// The component name, without namespace.
    fn component_name() -> &'static str {
        Self::NAME.unwrap_or_else(type_identity::<Self>)
    }
}

pub(crate) type Setter<C> = Box<dyn Fn(&mut C, &ComponentHandle) -> Result<(), &'static str>>;

/// Static description of one declared slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    /// Name of the component that fills this slot.
    pub dependency: String,
    /// Type name the resolved instance must be assignable to.
    pub expected: &'static str,
}

pub(crate) struct Slot<C> {
    pub(crate) info: SlotInfo,
    pub(crate) setter: Setter<C>,
}

/// Builder handed to [`Component::dependencies`].
pub struct Dependencies<C> {
    slots: Vec<Slot<C>>,
    error: Option<RegistrationError>,
}

impl<C: Component> Dependencies<C> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            error: None,
        }
    }

    /// Declares a slot wired from the component registered as `name`.
    ///
    /// `T` is the slot's target type; the resolved instance must expose a view of
    /// it or resolution fails with a type mismatch.
    ///
    /// Wiring is not rolled back when a later slot fails, and a retried `get`
    /// calls `set` again on the same blueprint. `set` must therefore overwrite
    /// the field (as [`Dep::fill`] does) rather than accumulate into it.
    pub fn named<T: ?Sized + 'static>(
        &mut self,
        name: impl Into<String>,
        set: impl Fn(&mut C, Rc<T>) + 'static,
    ) -> &mut Self {
        let dependency = name.into();
        if self.error.is_some() {
            return self;
        }
        if dependency.is_empty() {
            self.error = Some(RegistrationError::EmptyDependencyName {
                component: C::component_name().to_string(),
            });
            return self;
        }
        if self.slots.iter().any(|s| s.info.dependency == dependency) {
            self.error = Some(RegistrationError::DuplicateSlot {
                component: C::component_name().to_string(),
                dependency,
            });
            return self;
        }

        let expected = std::any::type_name::<T>();
        let setter: Setter<C> = Box::new(move |blueprint, handle| {
            let value = handle.get::<T>().ok_or(expected)?;
            set(blueprint, value);
            Ok(())
        });
        self.slots.push(Slot {
            info: SlotInfo {
                dependency,
                expected,
            },
            setter,
        });
        self
    }

    /// Declares a slot whose dependency name is derived from the component type
    /// `D`, receiving `D`'s instance.
    pub fn typed<D: Component>(
        &mut self,
        set: impl Fn(&mut C, Rc<D::Instance>) + 'static,
    ) -> &mut Self {
        self.named::<D::Instance>(D::component_name(), set)
    }

    pub(crate) fn finish(self) -> Result<Vec<Slot<C>>, RegistrationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.slots),
        }
    }
}

/// Holder for a wired dependency.
///
/// Starts empty; the resolver fills it through the slot's setter before the
/// initializer runs.
pub struct Dep<T: ?Sized> {
    value: Option<Rc<T>>,
}

impl<T: ?Sized + 'static> Dep<T> {
    pub fn empty() -> Self {
        Self { value: None }
    }

    pub fn fill(&mut self, value: Rc<T>) {
        self.value = Some(value);
    }

    pub fn is_wired(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the wired value, or [`ConstructError::UnwiredSlot`].
    pub fn get(&self) -> Result<Rc<T>, ConstructError> {
        self.value.clone().ok_or(ConstructError::UnwiredSlot {
            expected: std::any::type_name::<T>(),
        })
    }
}

impl<T: ?Sized> Default for Dep<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: ?Sized> Clone for Dep<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Dep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("type_name", &std::any::type_name::<T>())
            .field("wired", &self.value.is_some())
            .finish()
    }
}
