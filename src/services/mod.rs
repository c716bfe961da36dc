pub mod conversation;
pub mod extract;
