pub mod goal;
pub mod juz;
pub mod log;
pub mod macros;
pub mod stats;

pub use goal::*;
pub use juz::*;
pub use log::*;
pub use stats::*;

crate::define_id_type!(i32, UserId);
