// Handlers behind `jwt_auth_middleware`. Each receives a `Caller` whose
// scope has already been resolved; every query filters on that scope.
pub mod bulletins;
pub mod nodes;
pub mod scope;
