pub mod compiler;
pub mod engine;
pub mod sink;
pub mod token;
