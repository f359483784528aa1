pub mod auth_api;
pub mod mediator;

pub use auth_api::HttpAuthApi;
pub use mediator::MediatorError;
pub use mediator::MediatorSettings;
pub use mediator::RequestMediator;
