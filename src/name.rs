//! # Component Names
//!
//! A component is addressed by a string name that doubles as its cache key and as
//! the value a dependent slot refers to. The name is derived from the declared
//! type's identity (`LowLevel` for `my_app::db::LowLevel<T>`), unless the
//! component carries an explicit tag. A caller-supplied namespace prefix is joined
//! with a colon: `ns1:ns2:TypeName`.

use crate::error::RegistrationError;
use std::fmt;

/// Separator between namespace segments and the component identity.
pub const NAMESPACE_SEPARATOR: char = ':';

/// The validated, fully-qualified name of a registered component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentName(String);

impl ComponentName {
    /// Builds a name from an optional namespace and a base identity.
    ///
    /// Every namespace segment must be non-empty and free of the separator. The
    /// base identity may itself contain separators (an explicit tag such as
    /// `"cache:primary"`), but none of its segments may be empty.
    pub fn qualified(namespace: &[&str], base: &str) -> Result<Self, RegistrationError> {
        for segment in namespace {
            if segment.is_empty() {
                return Err(RegistrationError::InvalidName {
                    name: base.to_string(),
                    reason: "empty namespace segment".to_string(),
                });
            }
            if segment.contains(NAMESPACE_SEPARATOR) {
                return Err(RegistrationError::InvalidName {
                    name: base.to_string(),
                    reason: format!(
                        "namespace segment '{segment}' contains '{NAMESPACE_SEPARATOR}'"
                    ),
                });
            }
        }
        if base.split(NAMESPACE_SEPARATOR).any(str::is_empty) {
            return Err(RegistrationError::InvalidName {
                name: base.to_string(),
                reason: "empty name segment".to_string(),
            });
        }

        let mut full = String::new();
        for segment in namespace {
            full.push_str(segment);
            full.push(NAMESPACE_SEPARATOR);
        }
        full.push_str(base);
        Ok(Self(full))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity without its namespace prefix.
    pub fn base(&self) -> &str {
        self.0.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Last path segment of a type name, generic arguments stripped.
///
/// `alloc::rc::Rc<my_app::Counter>` becomes `Rc`, `my_app::db::LowLevel` becomes
/// `LowLevel` and `dyn my_app::Counter` becomes `Counter`.
pub fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    let without_dyn = without_generics
        .strip_prefix("dyn ")
        .unwrap_or(without_generics);
    without_dyn.rsplit("::").next().unwrap_or(without_dyn)
}

/// The type identity of `T`, as used for implicit component names.
pub fn type_identity<T: ?Sized + 'static>() -> &'static str {
    short_type_name(std::any::type_name::<T>())
}
