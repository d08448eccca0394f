// Adapters layer: concrete implementations of the domain ports (local storage, geocoder http, address sources).

pub mod http;
pub mod source;
pub mod storage;
