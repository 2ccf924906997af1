pub mod collection;
pub mod resource;
pub mod short_link;
