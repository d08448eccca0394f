pub mod accuracy;
pub mod addresses;
pub mod checkpoint;
pub mod chunk;
pub mod engine;
pub mod pipeline;
pub mod response;
pub mod sampler;

pub use crate::domain::model::{AddressRecord, AddressTable, GeocodeResult, ResultTable};
pub use crate::domain::ports::{AddressSource, ConfigProvider, GeocodeClient, Storage};
pub use crate::utils::error::Result;
