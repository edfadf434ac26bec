use std::error;
use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum FetchError {
    HttpRequest(reqwest::Error),
    HttpStatus(StatusCode),
    JsonParse(serde_json::Error),
    Other(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FetchError::HttpRequest(ref err) => write!(f, "HTTP Request Error: {}", err),
            FetchError::HttpStatus(status) => write!(f, "HTTP Status Error: {}", status),
            FetchError::JsonParse(ref err) => write!(f, "JSON Parse Error: {}", err),
            FetchError::Other(ref err) => write!(f, "Other Error: {}", err),
        }
    }
}

impl error::Error for FetchError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            FetchError::HttpRequest(ref err) => Some(err),
            FetchError::JsonParse(ref err) => Some(err),
            FetchError::HttpStatus(_) | FetchError::Other(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> FetchError {
        FetchError::HttpRequest(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> FetchError {
        FetchError::JsonParse(err)
    }
}

impl From<&str> for FetchError {
    fn from(err: &str) -> FetchError {
        FetchError::Other(err.to_string())
    }
}

impl From<String> for FetchError {
    fn from(err: String) -> FetchError {
        FetchError::Other(err)
    }
}
