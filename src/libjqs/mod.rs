pub mod codec;
pub mod content;
pub mod error;
pub mod pool;
pub mod question;
pub mod session;
pub mod shuffle;
