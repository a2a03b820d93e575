pub mod mapping;
pub mod sync;

pub use crate::domain::model::{Entity, Project};
pub use crate::domain::ports::{Catalog, ProjectSource};
pub use crate::utils::error::Result;
