pub mod calculator;
pub mod constants;
pub mod error;
pub mod event;
pub mod forces;
pub mod outputs;
pub mod parameters;
pub mod session;
pub mod summary;

pub use flowforce_parser as parser;
