//! Cart types: the per-account cart and its line items.

mod cart;

pub use cart::{Cart, CartLine, MAX_QUANTITY_PER_LINE};
