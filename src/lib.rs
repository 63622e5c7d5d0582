pub mod capture;
pub mod contacts;
pub mod core;
pub mod leads;
pub mod main_module;
pub mod pipeline;
pub mod qr;
