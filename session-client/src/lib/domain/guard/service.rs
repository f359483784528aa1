use std::sync::Arc;

use crate::domain::guard::errors::AccessDenied;
use crate::domain::guard::models::GuardSettings;
use crate::domain::guard::models::RouteAuthRequirement;
use crate::domain::guard::models::RouteTable;
use crate::domain::guard::ports::Navigator;
use crate::domain::session::ports::SessionPort;

/// Decides whether navigation to a destination is allowed.
///
/// Every decision reads the session afresh; verdicts are never cached.
pub struct AccessGuard<S>
where
    S: SessionPort,
{
    session: Arc<S>,
    settings: GuardSettings,
}

impl<S> AccessGuard<S>
where
    S: SessionPort,
{
    pub fn new(session: Arc<S>, settings: GuardSettings) -> Self {
        Self { session, settings }
    }

    /// Decide on a navigation to a protected destination.
    ///
    /// # Arguments
    /// * `destination` - Requested destination, kept as the login return target
    /// * `requirement` - Requirement declared by the destination
    ///
    /// # Errors
    /// * `NotAuthenticated` - No live session
    /// * `UnauthorizedRole` - Live session without the required role
    pub fn decide(
        &self,
        destination: &str,
        requirement: &RouteAuthRequirement,
    ) -> Result<(), AccessDenied> {
        if !self.session.is_authenticated() {
            return Err(AccessDenied::NotAuthenticated {
                return_to: destination.to_string(),
            });
        }

        match &requirement.required_role {
            Some(role) if !self.session.has_role(role.as_str()) => {
                Err(AccessDenied::UnauthorizedRole {
                    required: role.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Decide, and on denial send the navigator to the redirect.
    ///
    /// # Returns
    /// `true` when the navigation may proceed
    pub fn can_activate(
        &self,
        destination: &str,
        requirement: &RouteAuthRequirement,
        navigator: &dyn Navigator,
    ) -> bool {
        match self.decide(destination, requirement) {
            Ok(()) => true,
            Err(denied) => {
                let redirect = denied.redirect(&self.settings);
                tracing::info!(
                    destination,
                    reason = %denied,
                    redirect = %redirect.to_url(),
                    "Navigation denied"
                );
                navigator.navigate(&redirect);
                false
            }
        }
    }

    /// Guard a navigation using a route table.
    ///
    /// Destinations absent from the table are public and always allowed.
    pub fn navigate(
        &self,
        destination: &str,
        routes: &RouteTable,
        navigator: &dyn Navigator,
    ) -> bool {
        match routes.requirement_for(destination) {
            Some(requirement) => self.can_activate(destination, requirement, navigator),
            None => true,
        }
    }
}
