use crate::config::AppConfig;
use crate::controller::{LoginController, LoginControllerBlueprint};
use crate::error::AppError;
use crate::http::Router;
use crate::jwt::JwtServiceBlueprint;
use crate::middleware::JwtMiddlewareBlueprint;
use crate::session::LoginServiceBlueprint;
use crate::store::MemoryStore;
use component_graph::{Component, ComponentHandle, ComponentName, ResolveError, Resolver};
use std::rc::Rc;
use tracing::info;

/// The name the application's root component is registered under.
pub const ROOT_COMPONENT: &str = "LoginController";

pub struct Application {
    resolver: Resolver,
    injected: bool,
}

impl Application {
    /// Registers every component of the login demo.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let mut resolver = Resolver::new();
        resolver.register(config)?;
        resolver.register(MemoryStore::new())?;
        resolver.register(JwtServiceBlueprint::default())?;
        resolver.register(LoginServiceBlueprint::default())?;
        resolver.register(JwtMiddlewareBlueprint::default())?;
        resolver.register(LoginControllerBlueprint::default())?;
        info!(components = resolver.len(), "Application registered");

        Ok(Self {
            resolver,
            injected: false,
        })
    }

    /// Replaces or adds a registration.
    ///
    /// Only meaningful before [`Application::inject`]; afterwards the cached
    /// instances are kept.
    pub fn register<C: Component>(&mut self, blueprint: C) -> Result<ComponentName, AppError> {
        Ok(self.resolver.register(blueprint)?)
    }

    /// Builds the whole graph. Calling it again is a no-op.
    ///
    /// Returns the number of components initialized by this call.
    pub fn inject(&mut self) -> Result<usize, AppError> {
        if self.injected {
            return Ok(0);
        }
        let created = self.resolver.warm_up()?;
        self.injected = true;
        info!(created, "Dependencies injected");
        Ok(created)
    }

    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// The finished component registered as `name`.
    pub fn component(&self, name: &str) -> Result<ComponentHandle, AppError> {
        if !self.injected {
            return Err(AppError::NotInjected);
        }
        self.resolver.instance(name).ok_or_else(|| {
            AppError::Resolve(ResolveError::Unregistered {
                name: name.to_string(),
            })
        })
    }

    pub fn component_as<T: ?Sized + 'static>(&self, name: &str) -> Result<Rc<T>, AppError> {
        let handle = self.component(name)?;
        handle.get::<T>().ok_or_else(|| {
            AppError::Resolve(ResolveError::TypeMismatch {
                component: name.to_string(),
                dependency: name.to_string(),
                found: handle.type_name(),
                expected: std::any::type_name::<T>(),
            })
        })
    }

    pub fn controller(&self) -> Result<Rc<LoginController>, AppError> {
        self.component_as::<LoginController>(ROOT_COMPONENT)
    }

    pub fn router(&self) -> Result<Router, AppError> {
        Ok(self.controller()?.router().clone())
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}
