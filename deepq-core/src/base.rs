//! Interfaces of the collaborators driven by the training loop.
mod env;
mod q_function;
mod step;
pub use env::Env;
pub use q_function::QFunction;
pub use step::Step;
