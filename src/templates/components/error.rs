use crate::errors::ServerError;
use crate::responses::html::html_with_status;
use crate::templates::desktop_layout;
use astra::{Body, Response};
use maud::html;
use tracing::{error, warn};

/// Convert a ServerError into a proper HTML response page
pub fn html_error_response(err: ServerError) -> Response {
    let status = err.status();
    if status >= 500 {
        error!(status, error = %err, "request failed");
    } else {
        warn!(status, error = %err, "request rejected");
    }
    render_error(status, &err.to_string())
}

fn render_error(status: u16, message: &str) -> Response {
    let page = desktop_layout(
        &format!("Error {status}"),
        html! {
            main class="container" {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/" { "← Back to the dashboard" } }
            }
        },
    );

    html_with_status(status, page).unwrap_or_else(|_| Response::new(Body::from(message.to_string())))
}
