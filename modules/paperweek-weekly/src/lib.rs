pub mod extract;
pub mod flows;
pub mod notify;
pub mod pipeline;
pub mod publish;
pub mod scheduler;
pub mod topics;
