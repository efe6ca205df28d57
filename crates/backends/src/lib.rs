pub mod investment;
pub mod spending;
pub mod trip;
