#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fakes;
pub mod test_db;

pub use fakes::*;
pub use test_db::*;
