use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, register_counter, register_gauge};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("ping_gate_requests_total", "Total number of requests seen by the limiter").unwrap();
    pub static ref ADMITTED_TOTAL: Counter =
        register_counter!("ping_gate_admitted_total", "Requests forwarded to the endpoint").unwrap();
    pub static ref REJECTED_TOTAL: Counter =
        register_counter!("ping_gate_rejected_total", "Requests rejected for exceeding the rate").unwrap();
    pub static ref SWEPT_TOTAL: Counter =
        register_counter!("ping_gate_swept_clients_total", "Idle clients removed by the reclamation loop").unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("ping_gate_tracked_clients", "Current number of tracked clients").unwrap();
}
