// Adapters layer: concrete data providers behind the `DataProvider` port.

pub mod rest;
pub mod snapshot;

pub use rest::RestDataProvider;
pub use snapshot::{Snapshot, SnapshotProvider};
