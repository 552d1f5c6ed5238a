pub mod image_description;
pub mod image_media;
pub mod merge;
pub mod outline;
pub mod render;
pub mod research_terms;
pub mod sections;
pub mod text;
pub mod text_media;
