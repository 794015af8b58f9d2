pub mod pagination;
pub mod pii;
pub mod validation;
pub mod window;

pub use pagination::{Page, PageRequest, SortDir};
pub use pii::Masked;
pub use validation::FieldError;
pub use window::{parse_instant, DateWindow, WindowError};
