#![feature(int_roundings)]
pub mod api;
pub mod id;
pub mod like;

pub use id::ObjectId;
pub use like::LikeTarget;
