//! WASM bindings for booking-engine.
//!
//! Lets the browser dashboard render the slot grid and pre-check a booking
//! form without its own copy of the rules. Everything crosses the boundary as
//! JSON strings, in the same record shapes the reservation endpoints return.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir static/wasm/ \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```

use booking_engine::time::parse_date;
use booking_engine::wire::{parse_reservations_json, parse_request_json};
use booking_engine::{compute_availability, summarize, DaySummary, EngineConfig, SlotStatus, TimeOfDay};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct AvailabilityDto {
    date: String,
    summary: DaySummary,
    slots: Vec<SlotStatus>,
}

// ---------------------------------------------------------------------------
// Plain-Rust implementations (testable off-wasm; JsValue panics natively)
// ---------------------------------------------------------------------------

fn parse_config(config_json: Option<&str>) -> Result<EngineConfig, String> {
    match config_json.map(str::trim) {
        None | Some("") => Ok(EngineConfig::default()),
        Some(json) => serde_json::from_str(json).map_err(|e| format!("Invalid config JSON: {}", e)),
    }
}

fn availability_json(
    date: &str,
    reservations_json: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let date = parse_date(date).map_err(|e| e.to_string())?;
    let config = parse_config(config_json)?;
    let catalog = config.slot_catalog().map_err(|e| e.to_string())?;
    let reservations = parse_reservations_json(reservations_json).map_err(|e| e.to_string())?;

    let slots = compute_availability(date, &catalog, &reservations, &config.buffer);
    let dto = AvailabilityDto {
        date: date.to_string(),
        summary: summarize(&slots),
        slots,
    };
    serde_json::to_string(&dto).map_err(|e| format!("Serialization error: {}", e))
}

fn check_json(
    request_json: &str,
    reservations_json: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let request = parse_request_json(request_json).map_err(|e| e.to_string())?;
    let config = parse_config(config_json)?;
    let catalog = config.slot_catalog().map_err(|e| e.to_string())?;
    let reservations = parse_reservations_json(reservations_json).map_err(|e| e.to_string())?;

    let result = booking_engine::check(&request, &catalog, &reservations, &config.buffer);
    serde_json::to_string(&result).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Status of every slot on `date`.
///
/// `reservations_json` is an array of reservation records (or
/// `{"reservations": [...]}`); `config_json` is an optional `EngineConfig`.
/// Returns `{date, summary, slots}` as a JSON string.
#[wasm_bindgen(js_name = "computeAvailability")]
pub fn compute_availability_js(
    date: &str,
    reservations_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    availability_json(date, reservations_json, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Check a booking form submission against a reservation snapshot.
///
/// Returns the `ConflictResult` as a JSON string. A rejection is a normal
/// return value; only malformed input throws.
#[wasm_bindgen(js_name = "checkBooking")]
pub fn check_booking_js(
    request_json: &str,
    reservations_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    check_json(request_json, reservations_json, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Normalize a time string (`"2:00 PM"`, `"14:00:00"`, ...) to `"HH:MM"`.
#[wasm_bindgen(js_name = "parseTimeOfDay")]
pub fn parse_time_of_day_js(text: &str) -> Result<String, JsValue> {
    TimeOfDay::parse(text)
        .map(|t| t.to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
