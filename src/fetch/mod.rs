pub mod bounded;
pub mod fetcher;
pub mod guard;

pub use bounded::{read_bounded, ReadError};
pub use fetcher::{FetchError, FetchResult, Fetcher};
pub use guard::{BlockReason, Blocked};
