pub mod html;
pub mod xlsx;

pub use crate::errors::ResultResp;
pub use html::html_response;
pub use xlsx::xlsx_response;
