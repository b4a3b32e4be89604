//! Concrete transformation and search visitors.

mod add_to_tag;
mod change_tag_value;
mod find_tags;
mod has_source_path;
mod remove_content;

pub use add_to_tag::AddToTagVisitor;
pub use change_tag_value::ChangeTagValueVisitor;
pub use find_tags::FindTagsVisitor;
pub use has_source_path::HasSourcePath;
pub use remove_content::RemoveContentVisitor;
