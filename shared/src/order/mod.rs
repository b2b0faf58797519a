//! Order domain vocabulary
//!
//! Status enums and wire DTOs shared between the server and its clients.

mod status;
mod types;

pub use status::{DiscountType, OrderStatus, PaymentMethod, PaymentStatus};
pub use types::{OrderLineRequest, Recipient};
