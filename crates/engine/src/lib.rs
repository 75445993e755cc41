pub mod budget;
pub mod fallback;
pub mod interview;
pub mod narrator;
pub mod person;
pub mod sanitize;
pub mod scene;
pub mod script;

pub use budget::{enforce_budget, Strategy, TARGET_WORDS};
pub use scene::{Scene, Storyboard};
pub use script::{convert_storyboard_to_script, convert_storyboard_with_budget};
