pub mod activity;
pub mod prediction;
pub mod productivity;
pub mod report;
pub mod revisiones;
pub mod settings;
