//! # Component Handles
//!
//! A [`ComponentHandle`] is what the instance cache stores and what `get` returns.
//! It owns the finished instance behind an `Rc` together with a table of *views*:
//! the concrete `Rc<Instance>` plus every `Rc<dyn Trait>` capability the
//! component chose to expose. A dependency slot is satisfied when the handle has a
//! view of the slot's target type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Collects the capability views of a freshly constructed instance.
///
/// Passed to [`Component::expose`](crate::Component::expose). The concrete type
/// is always registered; `expose` adds trait objects:
///
/// ```rust
/// use component_graph::Views;
/// use std::rc::Rc;
///
/// trait Counter {
///     fn counter(&self) -> u32;
/// }
///
/// struct LowLevel(u32);
///
/// impl Counter for LowLevel {
///     fn counter(&self) -> u32 {
///         self.0
///     }
/// }
///
/// fn expose(views: &mut Views<LowLevel>) {
///     views.provide::<dyn Counter>(|low| low);
/// }
/// ```
pub struct Views<I: 'static> {
    instance: Rc<I>,
    table: HashMap<TypeId, ViewEntry>,
}

struct ViewEntry {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl<I: 'static> Views<I> {
    pub(crate) fn new(instance: I) -> Self {
        let instance = Rc::new(instance);
        let mut table = HashMap::new();
        table.insert(
            TypeId::of::<I>(),
            ViewEntry {
                value: Box::new(instance.clone()),
                type_name: std::any::type_name::<I>(),
            },
        );
        Self { instance, table }
    }

    /// Exposes the instance as `Rc<T>`, usually a trait object.
    pub fn provide<T: ?Sized + 'static>(&mut self, view: impl FnOnce(Rc<I>) -> Rc<T>) -> &mut Self {
        let rc = view(self.instance.clone());
        self.table.insert(
            TypeId::of::<T>(),
            ViewEntry {
                value: Box::new(rc),
                type_name: std::any::type_name::<T>(),
            },
        );
        self
    }

    pub(crate) fn into_handle(self, name: impl Into<String>) -> ComponentHandle {
        ComponentHandle {
            inner: Rc::new(HandleInner {
                name: name.into(),
                type_name: std::any::type_name::<I>(),
                instance: self.instance,
                views: self.table,
            }),
        }
    }
}

/// A finished, cached component instance.
///
/// Cloning a handle is cheap and preserves identity: every clone, and every view
/// obtained from it, points at the same allocation.
#[derive(Clone)]
pub struct ComponentHandle {
    inner: Rc<HandleInner>,
}

struct HandleInner {
    name: String,
    type_name: &'static str,
    instance: Rc<dyn Any>,
    views: HashMap<TypeId, ViewEntry>,
}

impl ComponentHandle {
    /// Name of the component this instance was built for.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Fully qualified type name of the concrete instance.
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name
    }

    /// Returns the instance viewed as `T`, or `None` when it is not assignable.
    pub fn get<T: ?Sized + 'static>(&self) -> Option<Rc<T>> {
        self.inner
            .views
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.downcast_ref::<Rc<T>>())
            .cloned()
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.inner.views.contains_key(&TypeId::of::<T>())
    }

    /// Type names of every view, concrete type included, sorted.
    pub fn view_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.views.values().map(|v| v.type_name).collect();
        names.sort_unstable();
        names
    }

    /// True when both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &ComponentHandle) -> bool {
        Rc::ptr_eq(&self.inner.instance, &other.inner.instance)
    }

    /// Number of live references to the underlying instance.
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.inner.instance)
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.inner.name)
            .field("type_name", &self.inner.type_name)
            .field("views", &self.view_names())
            .finish()
    }
}
