pub mod checkout;
pub mod identity;
pub mod script;
pub mod usage;
