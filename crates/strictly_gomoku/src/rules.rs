//! Rule checks applied to a grid.

pub mod win;

pub use win::{check_win, longest_run};
