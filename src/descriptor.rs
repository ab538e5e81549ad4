//! # Component Descriptors
//!
//! A [`ComponentDescriptor`] is the passive record the resolver keeps for every
//! registration: the component's name, its declared slots and the blueprint
//! behind a type-erased [`Blueprint`] object. The slot set is fixed at
//! registration time.

use crate::component::{Component, Slot, SlotInfo};
use crate::error::ConstructError;
use crate::handle::{ComponentHandle, Views};
use crate::name::ComponentName;
use std::any::TypeId;

/// Type-erased view of a registered blueprint.
pub(crate) trait Blueprint {
    /// Fills slot `index` from `dependency`. On failure returns the slot's
    /// expected type name.
    fn wire(&mut self, index: usize, dependency: &ComponentHandle) -> Result<(), &'static str>;

    /// Runs the initializer and wraps its result in a handle.
    fn construct(&self, name: &ComponentName) -> Result<ComponentHandle, ConstructError>;
}

struct TypedBlueprint<C: Component> {
    value: C,
    setters: Vec<crate::component::Setter<C>>,
}

impl<C: Component> Blueprint for TypedBlueprint<C> {
    fn wire(&mut self, index: usize, dependency: &ComponentHandle) -> Result<(), &'static str> {
        match self.setters.get(index) {
            Some(setter) => setter(&mut self.value, dependency),
            None => Err("<undeclared slot>"),
        }
    }

    fn construct(&self, name: &ComponentName) -> Result<ComponentHandle, ConstructError> {
        let instance = self.value.construct()?;
        let mut views = Views::new(instance);
        C::expose(&mut views);
        Ok(views.into_handle(name.as_str()))
    }
}

/// Registration record for one component.
pub struct ComponentDescriptor {
    name: ComponentName,
    type_name: &'static str,
    type_id: TypeId,
    slots: Vec<SlotInfo>,
    blueprint: Box<dyn Blueprint>,
}

impl ComponentDescriptor {
    pub(crate) fn new<C: Component>(
        name: ComponentName,
        blueprint: C,
        slots: Vec<Slot<C>>,
    ) -> Self {
        let (infos, setters): (Vec<_>, Vec<_>) =
            slots.into_iter().map(|s| (s.info, s.setter)).unzip();
        Self {
            name,
            type_name: std::any::type_name::<C>(),
            type_id: TypeId::of::<C>(),
            slots: infos,
            blueprint: Box::new(TypedBlueprint {
                value: blueprint,
                setters,
            }),
        }
    }

    pub fn name(&self) -> &ComponentName {
        &self.name
    }

    /// Fully qualified type name of the blueprint.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True when this descriptor was registered from blueprint type `C`.
    pub fn is_blueprint<C: Component>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }

    pub fn slots(&self) -> &[SlotInfo] {
        &self.slots
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.dependency.as_str())
    }

    pub(crate) fn blueprint_mut(&mut self) -> &mut dyn Blueprint {
        self.blueprint.as_mut()
    }

    pub(crate) fn blueprint(&self) -> &dyn Blueprint {
        self.blueprint.as_ref()
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("slots", &self.slots)
            .finish()
    }
}
