pub mod dispatch;
pub mod email;
pub mod store;
pub mod trigger;
pub mod worker;
