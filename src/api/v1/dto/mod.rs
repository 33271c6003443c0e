pub mod groups;
pub mod organizations;
