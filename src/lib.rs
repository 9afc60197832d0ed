pub mod capture;
pub mod defuser;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod scanner;
pub mod settings;
pub mod slot;
pub mod splitter;
