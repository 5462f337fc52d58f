pub mod functions;
pub mod pipeline;
pub mod settings;
