pub mod pipeline;
pub mod profile;
