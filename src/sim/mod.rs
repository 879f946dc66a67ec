pub mod engine;
pub mod event;
pub mod lifecycle;
pub mod scheduler;
pub mod step;
pub mod world;
