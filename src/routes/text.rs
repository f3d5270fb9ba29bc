use crate::http::encoding::{compress, select_encoding};
use crate::http::latin1;
use crate::http::request::Request;
use crate::http::response::{Headers, Response, ResponseBuilder, StatusCode};
use crate::routes::{HandlerError, path_segment};

const ECHO_MARKER: &str = "/echo/";
const TEXT_PLAIN: &str = "text/plain";

/// `/echo/{text}`: the text back as the body, compressed if negotiated.
pub fn echo(request: &Request) -> Result<Response, HandlerError> {
    let text = path_segment(&request.path, ECHO_MARKER)?;
    negotiated_text(StatusCode::Ok, request, text)
}

/// `/`: empty 200.
pub fn blank() -> Response {
    ResponseBuilder::new(StatusCode::Ok)
        .sized_body(Vec::new())
        .header("Content-Type", TEXT_PLAIN)
        .build()
}

/// `/user-agent`: the `User-Agent` header as the body.
///
/// Unlike the other text routes this one never negotiates an encoding.
pub fn user_agent(request: &Request) -> Result<Response, HandlerError> {
    let agent = request
        .header("User-Agent")
        .ok_or(HandlerError::MissingHeader("User-Agent"))?;

    Ok(ResponseBuilder::new(StatusCode::Ok)
        .sized_body(latin1::encode(agent))
        .header("Content-Type", TEXT_PLAIN)
        .build())
}

/// Fallback: 404 whose body is the path without its surrounding slashes.
pub fn not_found(request: &Request) -> Result<Response, HandlerError> {
    negotiated_text(StatusCode::NotFound, request, request.path.trim_matches('/'))
}

fn negotiated_text(status: StatusCode, request: &Request, text: &str) -> Result<Response, HandlerError> {
    let mut headers = Headers::new();
    headers.insert("Content-Type", TEXT_PLAIN);
    let accepted = select_encoding(&request.headers, &mut headers);
    let body = compress(accepted.as_deref(), &latin1::encode(text))?;

    Ok(ResponseBuilder::new(status)
        .headers(headers)
        .sized_body(body)
        .build())
}
