pub mod error;
pub mod normalize;
pub mod reshape;
pub mod traits;
pub mod types;

pub use error::*;
pub use normalize::{find_close_column, normalize_columns};
pub use reshape::reshape;
pub use traits::*;
pub use types::*;
