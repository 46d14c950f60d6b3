pub mod fronius;
mod query;

pub use self::query::{QueryKind, QueryOptions, SolarApi};
