#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod fixtures;
mod store;

pub use fixtures::{test_email, test_user};
pub use store::{MemoryStore, unique_violation};
