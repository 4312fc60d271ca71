pub mod optimizer_controller;
pub mod optimizer_error;
