mod todo;

pub use todo::{DEFAULT_CATEGORY, Priority, Todo, is_default_category, parse_due_date};
