pub mod deps;
pub mod sync;
