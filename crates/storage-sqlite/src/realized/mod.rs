mod model;
mod repository;

pub use model::RealizedProfitDB;
pub use repository::RealizedProfitRepository;
