// Core modules: the structured value model and error modeling.
pub mod error;
pub mod value;
