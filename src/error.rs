//! # Resolver Errors
//!
//! Every failure the resolver can report is a value from this module. None of them
//! terminate the process; the caller decides whether a failed resolution aborts
//! startup or is retried after a corrective registration.
//!
//! - [`RegistrationError`]: a blueprint could not be turned into a descriptor.
//! - [`ResolveError`]: `get` could not produce a finished instance.
//! - [`ConstructError`]: a component's own initializer failed.

/// Errors raised while registering a blueprint.
///
/// Registration is all-or-nothing: when one of these is returned the registry is
/// left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("component '{component}' declares a dependency slot with an empty name")]
    EmptyDependencyName { component: String },

    #[error("component '{component}' declares dependency '{dependency}' more than once")]
    DuplicateSlot {
        component: String,
        dependency: String,
    },

    #[error("invalid component name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A derived name is already taken by a different blueprint type.
    #[error(
        "'{registered}' derives the name '{name}', which is already registered by \
         '{existing}'; give one of them an explicit name"
    )]
    NameCollision {
        name: String,
        existing: &'static str,
        registered: &'static str,
    },
}

/// Errors raised by a component initializer.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    /// A dependency slot was read before the resolver wired it.
    #[error("dependency slot of type '{expected}' was never wired")]
    UnwiredSlot { expected: &'static str },

    #[error("initializer panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl ConstructError {
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ConstructError::Failed(Box::new(err))
    }
}

impl From<String> for ConstructError {
    fn from(msg: String) -> Self {
        ConstructError::Failed(msg.into())
    }
}

impl From<&str> for ConstructError {
    fn from(msg: &str) -> Self {
        ConstructError::Failed(msg.into())
    }
}

/// Errors raised while resolving a component.
///
/// Nested failures are propagated unchanged, so the variant always names the
/// component where resolution actually broke, not the one the caller asked for.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("'{name}' is not provided (registered)")]
    Unregistered { name: String },

    #[error(
        "cycle dependency detected, '{component}' and '{dependency}' depend on each other ({})",
        .path.join(" -> ")
    )]
    Cycle {
        component: String,
        dependency: String,
        /// The resolution path from the requested root to the repeated name.
        path: Vec<String>,
    },

    #[error(
        "'{found}' is not assignable to '{expected}' \
         (dependency '{dependency}' of '{component}')"
    )]
    TypeMismatch {
        component: String,
        dependency: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("failed to initialize '{component}': {source}")]
    Initialization {
        component: String,
        #[source]
        source: ConstructError,
    },
}

impl ResolveError {
    /// The component this error is primarily about.
    pub fn component(&self) -> &str {
        match self {
            ResolveError::Unregistered { name } => name,
            ResolveError::Cycle { component, .. }
            | ResolveError::TypeMismatch { component, .. }
            | ResolveError::Initialization { component, .. } => component,
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, ResolveError::Cycle { .. })
    }

    pub fn is_unregistered(&self) -> bool {
        matches!(self, ResolveError::Unregistered { .. })
    }
}
