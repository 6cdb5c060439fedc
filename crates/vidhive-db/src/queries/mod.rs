pub mod comments;
#[cfg(test)]
pub(crate) mod test_support;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;
