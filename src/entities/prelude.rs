pub use super::environments::Entity as Environments;
pub use super::tags::Entity as Tags;
pub use super::template_tags::Entity as TemplateTags;
pub use super::templates::Entity as Templates;
