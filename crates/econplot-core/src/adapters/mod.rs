mod bls;
mod file;
mod fred;

pub use bls::{period_start, BlsAdapter};
pub use file::FileSource;
pub use fred::FredAdapter;
