#![allow(warnings)]

pub mod callbacks;
pub mod channel;
pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod global;
pub mod logger;
pub mod notifications;
pub mod session;
