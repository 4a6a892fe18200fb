pub mod prelude;

pub mod environments;
pub mod tags;
pub mod template_tags;
pub mod templates;
