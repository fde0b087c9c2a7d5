pub mod jwt;

use uuid::Uuid;

/// Authenticated caller, injected into request extensions by the auth
/// middleware. Handlers take the acting user from here, never from the
/// request body.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
}
