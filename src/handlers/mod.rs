// Public (no auth) and protected (JWT, scope resolved) handlers.
pub mod protected;
pub mod public;
