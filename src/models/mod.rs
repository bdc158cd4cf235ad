pub mod params;
pub mod response;
pub mod types;

// Re-export
pub use params::{
    MAX_LIMIT, MarketSummariesParams, OhlcvParams, OrderBookCalculatorParams, OrderBookParams,
    PaginationParams, QueryParams, SummaryKey, TradeParams,
};
pub use response::{Allowance, AllowanceWire, Cursor, PaginatedResponse, Response, ResponseRoot};
pub use types::*;
