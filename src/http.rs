use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum HttpError {
    #[error("HTTP status {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: usize, last: Box<HttpError> },
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestOptions {
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) attempts: usize,
    pub(crate) retry_delay: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(5),
            attempts: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

pub(crate) fn get_text_with_retries(
    url: &str,
    options: &RequestOptions,
) -> Result<String, HttpError> {
    let attempts = options.attempts.max(1);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(options.connect_timeout)
        .timeout_read(options.read_timeout)
        .timeout_write(options.read_timeout)
        .build();

    let mut last_error = None;
    for attempt in 1..=attempts {
        let error = match agent.get(url).call() {
            Ok(response) => {
                return response
                    .into_string()
                    .map_err(|err| HttpError::Decode(err.to_string()));
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().ok().unwrap_or_default();
                let error = HttpError::Status {
                    status,
                    body: body.trim().chars().take(240).collect(),
                };
                if !should_retry_http_status(status) {
                    return Err(error);
                }
                error
            }
            Err(ureq::Error::Transport(err)) => HttpError::Transport(err.to_string()),
        };

        if attempt < attempts {
            warn!(url, attempt, %error, "request failed, retrying");
            thread::sleep(options.retry_delay);
        }
        last_error = Some(error);
    }

    let last = last_error.unwrap_or_else(|| HttpError::Transport("no attempt made".to_string()));
    if attempts == 1 {
        return Err(last);
    }
    Err(HttpError::Exhausted {
        attempts,
        last: Box::new(last),
    })
}
