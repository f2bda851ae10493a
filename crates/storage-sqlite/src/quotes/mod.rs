mod model;
mod repository;

pub use model::PriceQuoteDB;
pub use repository::PriceQuoteRepository;
