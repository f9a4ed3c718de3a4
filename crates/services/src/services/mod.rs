pub mod api_fetcher;
pub mod user_profile;
