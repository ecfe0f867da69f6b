pub mod format;
pub mod lenient;
pub mod logger;
pub mod time;
