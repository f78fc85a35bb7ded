// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    CheckOverrides, exit_code_for, load_config, render_report, resolve_init_path,
    write_config_template,
};

// Re-export the check pass from mailqa-core
pub use mailqa_core::check::{CheckOptions, CheckProgressCallback, execute_check};
