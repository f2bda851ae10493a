mod model;
mod repository;

pub use model::ExchangeRateDB;
pub use repository::ExchangeRateRepository;
