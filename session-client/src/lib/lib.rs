pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::guard;
pub use domain::identity;
pub use domain::session;
pub use domain::token;

#[cfg(test)]
pub(crate) mod test_support;
