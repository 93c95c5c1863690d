pub mod interaction;
pub mod session;
pub mod shared;
