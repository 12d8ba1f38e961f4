pub mod command;

pub use command::CommandSession;
