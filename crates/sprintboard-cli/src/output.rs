//! JSON envelope for every command result.
//!
//! Successes go to stdout, failures to stderr with exit status 1. Failures
//! that came from the engine also carry `error_kind` so scripts can tell a
//! validation problem from a server rejection.

use serde::Serialize;
use sprintboard_core::BoardError;

const API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl<T: Serialize> Envelope<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            api_version: API_VERSION,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }
}

fn failure(err: &anyhow::Error) -> Envelope<()> {
    Envelope {
        success: false,
        api_version: API_VERSION,
        data: None,
        error: Some(format!("{:#}", err)),
        error_kind: err.downcast_ref::<BoardError>().map(BoardError::kind),
    }
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

pub fn output_success<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&Envelope::ok(data))?);
    Ok(())
}

pub fn output_list<T: Serialize>(items: Vec<T>) -> anyhow::Result<()> {
    let count = items.len();
    output_success(ListResponse { items, count })
}

pub fn output_error(err: &anyhow::Error) -> ! {
    match serde_json::to_string(&failure(err)) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{:#}", err),
    }
    std::process::exit(1);
}
