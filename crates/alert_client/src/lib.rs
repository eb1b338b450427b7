pub mod adapter;
pub mod transport;

pub use adapter::{Aggregate, AggregateKind, AlertQueryAdapter, TimeRange};
pub use transport::http::{ApiConfig, HttpTransport};
pub use transport::{AlertTransport, ApiRequest, CancelToken, TransportError};
