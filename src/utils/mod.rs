pub mod clock;
#[cfg(test)]
pub mod test_server;
