pub mod client;
pub mod validator;
