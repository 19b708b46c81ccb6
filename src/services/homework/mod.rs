pub mod record;
pub mod scheduler;
pub mod vocabulary;
