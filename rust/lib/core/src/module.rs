use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module implements this trait to register its callable
/// endpoints. The binary entry point collects all modules and nests each
/// router under `/{name}`.
pub trait Module: Send + Sync {
    /// Module name, used for logging and route prefixes.
    fn name(&self) -> &str;

    /// Return the module's routes, to be nested under `/{name}`.
    fn routes(&self) -> Router;
}
