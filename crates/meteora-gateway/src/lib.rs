pub mod params;
pub mod session;

pub use params::{FetchQuery, PageParams};
pub use session::{SessionEnd, run_fetch_session, run_submit_session};
