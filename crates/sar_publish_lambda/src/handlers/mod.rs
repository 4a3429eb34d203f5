pub mod application;
pub mod fetch;
pub mod publish;
