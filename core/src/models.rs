mod mood;
mod rating;
mod tag;

pub use mood::{MoodDraft, MoodRecord};
pub use rating::MoodRating;
pub use tag::TagSet;
