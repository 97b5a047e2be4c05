mod add;
mod list;
mod poll;
mod remove;

pub use add::add;
pub use list::list;
pub use poll::{check, watch};
pub use remove::remove;
