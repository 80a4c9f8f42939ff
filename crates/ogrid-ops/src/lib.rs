pub mod builder;
pub mod case;
pub mod error;

mod cone;
mod cylinder;
mod hollow;
mod projector;
mod sphere;

pub use builder::{execute_ogrid, OGridBuild};
pub use case::{classify, GridKind};
pub use error::BuildError;
