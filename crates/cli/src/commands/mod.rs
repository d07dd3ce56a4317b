pub mod hosts;
pub mod pricing;
pub mod settings;
