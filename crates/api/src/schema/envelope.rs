//! Uniform mutation response.
//!
//! Every mutation answers with `{success, message, <entity>}` where the
//! entity key is named by the payload type:
//!
//! ```json
//! {"success": true, "message": "Customer with email ana@example.com created successfully",
//!  "customer": {"id": 1, "email": "ana@example.com", "username": "ana", "phone": null}}
//! ```

use serde::{Deserialize, Serialize};

use super::types::{CustomerView, OrderView, ProductView};

/// A mutation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<P> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> Envelope<P> {
    /// A successful result.
    pub fn succeeded(message: impl Into<String>, payload: P) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload,
        }
    }

    /// A soft failure: the request was understood but nothing was done.
    pub fn failed(message: impl Into<String>, payload: P) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload,
        }
    }
}

/// Customer mutation payload. `None` when no customer matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPayload {
    pub customer: Option<CustomerView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub product: ProductView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub order: OrderView,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_flattened() {
        let envelope = Envelope::failed(
            "Customer with email x@y.z not found",
            CustomerPayload { customer: None },
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "message": "Customer with email x@y.z not found",
                "customer": null
            })
        );
    }
}
