use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::schema::{ParamSpec, ParamType, SchemaError, ToolSignature};
use crate::ToolFn;

/// Returns the estimated delivery date for a package.
///
/// A stand-in for a real shipment lookup: it answers with now plus a
/// random 1..=14 days. The date is returned as an RFC 3339 string so
/// the result is JSON-serializable.
pub struct DeliveryDateTool;

#[async_trait]
impl ToolFn for DeliveryDateTool {
    fn signature(&self) -> Result<ToolSignature, SchemaError> {
        Ok(ToolSignature::new(
            "get_estimated_delivery_date",
            "get the estimated delivery date for a package",
            vec![ParamSpec::required("tracking_number", ParamType::Text)],
        ))
    }

    async fn call(&self, args: &Map<String, Value>) -> Result<Value> {
        let tracking_number = args
            .get("tracking_number")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("missing 'tracking_number' parameter"))?;

        // In reality we'd look the tracking number up in a database and
        // return a real estimate.
        log::debug!("estimating delivery for tracking number {tracking_number}");
        let estimate: DateTime<Utc> = Utc::now() + Duration::days(fastrand::i64(1..=14));

        Ok(Value::String(estimate.to_rfc3339()))
    }
}

/// Returns the current date and time in UTC. Takes no parameters.
pub struct CurrentTimeTool;

#[async_trait]
impl ToolFn for CurrentTimeTool {
    fn signature(&self) -> Result<ToolSignature, SchemaError> {
        Ok(ToolSignature::new(
            "get_current_time",
            "Get the current date and time in UTC format. Takes no parameters.",
            vec![],
        ))
    }

    async fn call(&self, _args: &Map<String, Value>) -> Result<Value> {
        let now: DateTime<Utc> = Utc::now();
        Ok(Value::String(
            now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ))
    }
}
