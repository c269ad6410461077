//! Query request building and response handling
//!
//! Options and parameters are attached to a query through [`QueryOptions`];
//! the connection turns them into headers, request properties and the
//! parameter declaration clause.

pub mod options;
pub mod params;
pub mod result;

pub use options::{QueryOptions, RequestProperties};
pub use params::{DecimalDefault, Definitions, ParamDefault, ParamType, Parameters};
pub use result::QueryResponse;
