use std::fmt;

use crate::error::ClientError;

/// Longest pin code accepted from the server
pub const MAX_PIN_CODE_LEN: usize = 256;

/// Server-assigned order identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(u64);

impl OrderId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secret needed alongside the order id to collect a render.
///
/// Whitespace is stripped on parse. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct PinCode(String);

impl PinCode {
    pub fn parse(raw: &str) -> Result<Self, ClientError> {
        let pin: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if pin.is_empty() {
            return Err(ClientError::Protocol("pin code is empty".to_string()));
        }
        if pin.chars().count() > MAX_PIN_CODE_LEN {
            return Err(ClientError::Protocol(format!(
                "pin code longer than {MAX_PIN_CODE_LEN} characters"
            )));
        }
        if pin.chars().any(char::is_control) {
            return Err(ClientError::Protocol(
                "pin code contains control characters".to_string(),
            ));
        }
        Ok(Self(pin))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinCode(***)")
    }
}

/// Credentials for collecting one render.
///
/// Not `Clone`: polling consumes the handle, since the server refuses a
/// second collection.
#[derive(Debug, PartialEq, Eq)]
pub struct OrderHandle {
    order_id: OrderId,
    pin_code: PinCode,
}

impl OrderHandle {
    pub fn new(order_id: OrderId, pin_code: PinCode) -> Self {
        Self { order_id, pin_code }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn pin_code(&self) -> &PinCode {
        &self.pin_code
    }

    pub fn into_parts(self) -> (OrderId, PinCode) {
        (self.order_id, self.pin_code)
    }
}
