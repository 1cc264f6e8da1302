pub mod program;
pub mod session;
