pub mod browse;
pub mod insights;
pub mod providers;
pub mod recommendations;
pub mod reconciler;
pub mod sessions;
pub mod title_resolver;
pub mod title_search;

#[cfg(test)]
pub(crate) mod testing;

pub use reconciler::SuggestionReconciler;
pub use sessions::{SessionRegistry, SessionTicket};
pub use title_resolver::TitleResolver;
