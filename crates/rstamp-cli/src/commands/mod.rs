pub mod config;
pub mod info;
pub mod profiles;
pub mod stamp;

pub use info::show_info;
pub use stamp::run_stamp;
