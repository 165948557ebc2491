pub mod actions;
pub mod dispatch;
pub mod flatten;
pub mod scroll;
pub mod store;
pub mod validate;

pub use actions::*;
pub use dispatch::*;
pub use flatten::*;
pub use scroll::*;
pub use store::*;
pub use validate::*;
