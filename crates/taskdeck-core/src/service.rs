//! Engines that implement taskdeck operations on top of the collaborator traits.

pub mod catalog;
pub mod search;
pub mod todos;

pub use catalog::CatalogService;
pub use search::TodoSearchEngine;
pub use todos::{
    TodoService, CATEGORY_NOT_OWNED_MESSAGE, TAGS_NOT_OWNED_MESSAGE,
};
