use serde::{Deserialize, Serialize};

pub const GREETING: &str = "Hi, you have reached the API. How may I help you?";
pub const AT_CAPACITY: &str = "the API is at capacity";

// JSON payload for both the greeting and the rejection
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub status: String,
    pub body: String,
}

impl Message {
    pub fn greeting() -> Self {
        Self {
            status: "Successful".to_string(),
            body: GREETING.to_string(),
        }
    }

    pub fn at_capacity() -> Self {
        Self {
            status: "Request failed".to_string(),
            body: AT_CAPACITY.to_string(),
        }
    }
}
