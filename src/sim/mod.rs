pub mod driver;
pub mod event;
pub mod level;
pub mod save;
pub mod step;
pub mod world;
