use thiserror::Error;

use crate::domain::guard::models::GuardSettings;
use crate::domain::guard::models::Redirect;
use crate::domain::identity::models::Role;

/// Reason a navigation was refused.
///
/// Denials are redirects, not faults.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("Authentication required for {return_to}")]
    NotAuthenticated { return_to: String },

    #[error("Role {required} required")]
    UnauthorizedRole { required: Role },
}

impl AccessDenied {
    /// Where the denied navigation should go instead.
    pub fn redirect(&self, settings: &GuardSettings) -> Redirect {
        match self {
            AccessDenied::NotAuthenticated { return_to } => Redirect::Login {
                path: settings.login_path.clone(),
                return_to: return_to.clone(),
                return_param: settings.return_param.clone(),
            },
            AccessDenied::UnauthorizedRole { .. } => Redirect::Unauthorized {
                path: settings.unauthorized_path.clone(),
            },
        }
    }
}
