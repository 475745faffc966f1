pub mod history;
pub mod repository;

pub use repository::GitRepository;
