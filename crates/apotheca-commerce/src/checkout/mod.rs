//! Checkout types: selection resolution, shipping address and orders.

mod address;
mod order;
mod selection;

pub use address::ShippingAddress;
pub use order::{Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus, StatusEntry};
pub use selection::{
    normalize_selection, resolve_selection, LineTarget, ResolvedLine, SelectionEntry,
    SelectionInput,
};
