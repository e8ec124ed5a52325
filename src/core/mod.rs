mod app;

pub use app::{AppBuilder, TypedAppBuilder, VendHub};
