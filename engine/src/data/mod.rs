pub mod csv_parser;
pub mod market_data;
pub mod price_series;
pub mod provider;

pub use market_data::MarketDataStore;
pub use price_series::PriceSeries;
pub use provider::{CsvPriceProvider, PriceProvider};
