pub mod homework;
pub mod practicum;
pub mod telegram;
