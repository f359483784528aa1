use crate::domain::guard::models::Redirect;

/// Port for whatever performs navigation on the client.
pub trait Navigator: Send + Sync {
    /// Navigate away to a redirect destination.
    fn navigate(&self, redirect: &Redirect);
}
