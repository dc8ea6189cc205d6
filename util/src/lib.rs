pub mod content;
pub mod markup;
pub mod validation;
