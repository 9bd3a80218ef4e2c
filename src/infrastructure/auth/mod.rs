pub mod session_gateway;

pub use session_gateway::SessionAuthGateway;
