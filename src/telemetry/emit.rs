use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "portfolio.v1";

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl Envelope {
    pub fn plan<T: Serialize>(op: &'static str, plan: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(op, false, Some(serde_json::to_value(plan)?), None))
    }

    pub fn result<T: Serialize>(op: &'static str, result: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(op, true, None, Some(serde_json::to_value(result)?)))
    }

    fn new(op: &'static str, apply: bool, plan: Option<Value>, result: Option<Value>) -> Self {
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            apply,
            plan,
            result,
        }
    }
}

pub fn print_envelope(env: &Envelope) -> Result<()> {
    let mut out = io::stdout();
    serde_json::to_writer(&mut out, env)?;
    writeln!(&mut out)?;
    out.flush()?;
    Ok(())
}
