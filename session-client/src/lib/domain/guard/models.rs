use serde::Deserialize;

use crate::domain::identity::models::Role;

/// Authorization requirement attached to a navigable destination.
///
/// `None` means any authenticated identity may enter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAuthRequirement {
    pub required_role: Option<Role>,
}

impl RouteAuthRequirement {
    /// Requirement satisfied by any authenticated identity.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requirement satisfied only by the given role.
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            required_role: Some(Role::new(role)),
        }
    }

    /// Build from route metadata. Only the first role is enforced.
    pub fn from_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        Self {
            required_role: roles.first().map(|role| Role::new(role.as_ref())),
        }
    }
}

/// Route metadata as declared in configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProtectedRoute {
    pub path: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Protected destinations and their requirements.
///
/// Paths are compared without leading or trailing slashes. A path that is
/// not in the table is public.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<(String, RouteAuthRequirement)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a protected destination.
    pub fn protect(mut self, path: &str, requirement: RouteAuthRequirement) -> Self {
        self.routes.push((normalize(path).to_string(), requirement));
        self
    }

    /// Requirement for a destination, ignoring any query string.
    ///
    /// # Returns
    /// `None` when the destination is public
    pub fn requirement_for(&self, destination: &str) -> Option<&RouteAuthRequirement> {
        let path = normalize(destination.split(['?', '#']).next().unwrap_or_default());

        self.routes
            .iter()
            .find(|(route, _)| route == path)
            .map(|(_, requirement)| requirement)
    }
}

impl<'a> FromIterator<&'a ProtectedRoute> for RouteTable {
    fn from_iter<I: IntoIterator<Item = &'a ProtectedRoute>>(iter: I) -> Self {
        iter.into_iter().fold(RouteTable::new(), |table, route| {
            table.protect(&route.path, RouteAuthRequirement::from_roles(&route.roles))
        })
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Where the guard sends a denied navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Login page, remembering the originally requested destination.
    Login { path: String, return_to: String, return_param: String },
    /// Known identity with insufficient privilege.
    Unauthorized { path: String },
}

impl Redirect {
    /// Render the redirect as a navigable URL.
    pub fn to_url(&self) -> String {
        match self {
            Redirect::Login {
                path,
                return_to,
                return_param,
            } => format!("{}?{}={}", path, return_param, urlencoding::encode(return_to)),
            Redirect::Unauthorized { path } => path.clone(),
        }
    }
}

/// Redirect destinations used by the guard.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuardSettings {
    pub login_path: String,
    pub unauthorized_path: String,
    pub return_param: String,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
            return_param: "returnUrl".to_string(),
        }
    }
}
