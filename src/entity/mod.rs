pub mod cart_items;
pub mod carts;
pub mod foods;
pub mod order_items;
pub mod orders;
pub mod restaurants;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use foods::Entity as Foods;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use restaurants::Entity as Restaurants;
pub use users::Entity as Users;
