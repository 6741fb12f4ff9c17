pub mod model_gateway;
pub mod prompts;

pub use model_gateway::ModelGateway;
