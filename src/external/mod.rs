pub mod documents;
pub mod notifier;
pub mod weather;
