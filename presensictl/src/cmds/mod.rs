pub use acquire::*;
pub use check::*;
pub use submit::*;

mod acquire;
mod check;
mod submit;
