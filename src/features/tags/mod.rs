mod service;

pub use service::TagService;
