pub mod arena;
pub mod gate;
pub mod name;
mod scheduler;
