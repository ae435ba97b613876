pub mod logging;
pub mod url_list;

pub use logging::initialize_logging;
pub use url_list::read_url_list;
