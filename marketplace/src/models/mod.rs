// farmconnect/src/models/mod.rs

//! Domain records shared by the cart, the checkout pipeline and the stores.

pub mod cart_line;
pub mod delivery;
pub mod order;
pub mod order_intent;
pub mod product;
pub mod user;

pub use cart_line::CartLine;
pub use delivery::DeliveryDetails;
pub use order::{NewOrder, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, UnknownVariant};
pub use order_intent::OrderIntent;
pub use product::Product;
pub use user::CurrentUser;
