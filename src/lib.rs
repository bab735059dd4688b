mod as_value;
mod connection;
mod error;
mod executor;
mod expression;
mod prepared;
mod query;
mod queue;
mod schema;
mod select;
mod util;
mod value;
mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use connection::*;
pub use error::*;
pub use executor::*;
pub use expression::*;
pub use prepared::*;
pub use query::*;
pub use queue::*;
pub use schema::*;
pub use select::*;
pub use util::*;
pub use value::*;
pub use writer::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
