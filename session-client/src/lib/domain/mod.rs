pub mod guard;
pub mod identity;
pub mod session;
pub mod token;
