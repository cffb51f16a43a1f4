//! Provider callback detection and the loopback listener that receives it.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use super::error::AuthError;

/// How long an interactive login waits for the browser to come back.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Authorization response carried on the callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Returns the callback parameters when both `code` and `state` are present.
pub fn callback_params(url: &Url) -> Option<CallbackParams> {
    Some(CallbackParams {
        code: query_value(url, "code")?,
        state: query_value(url, "state")?,
    })
}

/// Interprets the request line of a callback hit, e.g.
/// `GET /dashboard?state=..&code=.. HTTP/1.1`. Returns `Ok(None)` for requests
/// that are not a callback at all: empty preconnects, `GET /`, favicons.
pub fn parse_callback_request(
    request: &str,
    expected_state: &str,
) -> Result<Option<CallbackParams>, AuthError> {
    let Some(target) = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
    else {
        return Ok(None);
    };
    let Ok(url) = Url::parse(&format!("http://localhost{target}")) else {
        return Ok(None);
    };

    if let Some(error) = query_value(&url, "error") {
        let description = query_value(&url, "error_description").unwrap_or_default();
        return Err(AuthError::Provider(
            format!("{error} {description}").trim().to_string(),
        ));
    }

    let Some(params) = callback_params(&url) else {
        return Ok(None);
    };
    if params.state != expected_state {
        return Err(AuthError::StateMismatch);
    }
    Ok(Some(params))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn html_response(status: &str, message: &str) -> String {
    let body = format!(
        "<html><body style=\"font-family:sans-serif;text-align:center;margin-top:20vh\">\
         <h2>BusinessPro</h2><p>{}</p></body></html>",
        escape_html(message)
    );
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// One-shot HTTP listener bound to the redirect origin.
pub struct CallbackListener {
    listener: TcpListener,
}

impl CallbackListener {
    /// Binds to the host and port of `redirect_uri`.
    pub async fn bind(redirect_uri: &str) -> Result<Self, AuthError> {
        let url = Url::parse(redirect_uri)
            .map_err(|e| AuthError::Callback(format!("invalid redirect uri: {e}")))?;
        let host = match url.host_str() {
            Some("localhost") | None => "127.0.0.1",
            Some(host) => host,
        };
        let port = url.port_or_known_default().unwrap_or(80);
        Self::bind_addr(&format!("{host}:{port}")).await
    }

    pub async fn bind_addr(addr: &str) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AuthError::Callback(format!("cannot listen on {addr}: {e}")))?;
        Ok(Self { listener })
    }

    #[cfg(test)]
    pub fn port(&self) -> Option<u16> {
        self.listener.local_addr().ok().map(|addr| addr.port())
    }

    /// Waits for the provider to redirect the browser back, answers the browser,
    /// and returns the authorization code.
    pub async fn wait_for_code(
        self,
        expected_state: &str,
        timeout: Duration,
    ) -> Result<String, AuthError> {
        tokio::time::timeout(timeout, self.accept_one(expected_state))
            .await
            .map_err(|_| AuthError::Timeout)?
    }

    async fn accept_one(self, expected_state: &str) -> Result<String, AuthError> {
        loop {
            let (mut stream, _) = self.listener.accept().await?;
            let mut buffer = [0u8; 4096];
            let read = match stream.read(&mut buffer).await {
                Ok(read) => read,
                Err(e) => {
                    log::debug!("Dropped callback connection: {e}");
                    continue;
                }
            };
            let request = String::from_utf8_lossy(&buffer[..read]);

            let outcome = match parse_callback_request(&request, expected_state) {
                Ok(Some(params)) => Ok(params.code),
                Ok(None) => {
                    // Preconnects and stray requests before the real redirect
                    if read > 0 {
                        let _ = stream
                            .write_all(html_response("404 Not Found", "Not found.").as_bytes())
                            .await;
                    }
                    continue;
                }
                Err(e) => Err(e),
            };

            let response = match &outcome {
                Ok(_) => html_response(
                    "200 OK",
                    "Signed in. You can close this window and return to BusinessPro.",
                ),
                Err(e) => html_response("400 Bad Request", &format!("Sign-in failed: {e}")),
            };
            if let Err(e) = stream.write_all(response.as_bytes()).await {
                log::warn!("Failed to answer callback request: {e}");
            }
            return outcome;
        }
    }
}
