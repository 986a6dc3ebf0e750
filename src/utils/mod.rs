mod io_utils;
mod util;

pub use io_utils::{create_writer, open_input_reader};
pub use util::{build_thread_pool, handle_error_and_exit, Result};
