//! Exchange adapter boundary. Real exchange connectivity is an external
//! collaborator (§1); this workspace supplies only the trait and a
//! deterministic in-memory paper implementation, grounded on the teacher's
//! paper-broker crate: no randomness, no wall-clock reads, broker order id
//! equal to the client order id, fills applied exactly as requested.

use std::collections::BTreeMap;

use exd_schemas::Side;

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRequest {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitResponse {
    pub exchange_order_id: String,
    pub filled_qty: f64,
    pub avg_fill_price: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdapterError {
    pub message: String,
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl std::error::Error for AdapterError {}

/// The outbound contract every exchange adapter must implement (§6).
pub trait ExchangeAdapter {
    fn submit_order(&mut self, req: &SubmitRequest) -> Result<SubmitResponse, AdapterError>;
    fn fetch_position(&self, symbol: &str) -> f64;
    fn ping(&self) -> bool;
    fn server_time(&self) -> i64;
}

/// Deterministic in-memory paper adapter: accepts every submit immediately
/// and fully at the requested price. No randomness, no timestamps beyond
/// what the caller supplies.
#[derive(Clone, Debug, Default)]
pub struct PaperExchangeAdapter {
    positions: BTreeMap<String, f64>,
    clock_ms: i64,
}

impl PaperExchangeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_clock_ms(&mut self, ms: i64) {
        self.clock_ms = ms;
    }

    pub fn set_position(&mut self, symbol: impl Into<String>, qty_signed: f64) {
        self.positions.insert(symbol.into(), qty_signed);
    }
}

impl ExchangeAdapter for PaperExchangeAdapter {
    fn submit_order(&mut self, req: &SubmitRequest) -> Result<SubmitResponse, AdapterError> {
        let signed_delta = match req.side {
            Side::Long => req.quantity,
            Side::Short => -req.quantity,
        };
        *self.positions.entry(req.symbol.clone()).or_insert(0.0) += signed_delta;

        Ok(SubmitResponse {
            exchange_order_id: req.client_order_id.clone(),
            filled_qty: req.quantity,
            avg_fill_price: req.price,
        })
    }

    fn fetch_position(&self, symbol: &str) -> f64 {
        *self.positions.get(symbol).unwrap_or(&0.0)
    }

    fn ping(&self) -> bool {
        true
    }

    fn server_time(&self) -> i64 {
        self.clock_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_fills_immediately_and_fully() {
        let mut adapter = PaperExchangeAdapter::new();
        let resp = adapter
            .submit_order(&SubmitRequest {
                client_order_id: "c1".to_string(),
                symbol: "BTCUSDT".to_string(),
                side: Side::Long,
                quantity: 1.0,
                price: 50_000.0,
            })
            .unwrap();
        assert_eq!(resp.exchange_order_id, "c1");
        assert_eq!(resp.filled_qty, 1.0);
        assert_eq!(adapter.fetch_position("BTCUSDT"), 1.0);
    }

    #[test]
    fn short_submit_decreases_position() {
        let mut adapter = PaperExchangeAdapter::new();
        adapter
            .submit_order(&SubmitRequest {
                client_order_id: "c2".to_string(),
                symbol: "BTCUSDT".to_string(),
                side: Side::Short,
                quantity: 2.0,
                price: 50_000.0,
            })
            .unwrap();
        assert_eq!(adapter.fetch_position("BTCUSDT"), -2.0);
    }
}
