pub mod collection;
pub mod document;
pub mod models;
pub mod resources;
pub mod toc;

// Re-export the types every other crate in the workspace works with.
pub use collection::AccumulatedCollection;
pub use document::Document;
pub use models::{
    Attributes, Categories, ContentItem, ItemId, MediaRef, Page, PaginationError, PaginationMeta,
    Resource, SortDirection,
};
pub use resources::{BlogPost, Certification, Education, Experience, Project, Publication, Skill};
pub use toc::{extract_headings, Heading};
