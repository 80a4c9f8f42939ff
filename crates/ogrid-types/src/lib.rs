pub mod ogrid;
pub mod portion;
pub mod shape;

pub use ogrid::*;
pub use portion::*;
pub use shape::*;
