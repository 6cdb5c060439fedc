//! Shared seeding helpers for query tests.

use vidhive_types::ObjectId;

use crate::Database;

pub fn seed_user(db: &Database, username: &str) -> String {
    let id = ObjectId::new().to_string();
    db.create_user(
        &id,
        username,
        &format!("{username}@example.com"),
        "argon2-hash",
        &format!("{username} example"),
        "/media/avatar",
        None,
    )
    .unwrap();
    id
}

pub fn seed_video(db: &Database, owner_id: &str, title: &str) -> String {
    let id = ObjectId::new().to_string();
    db.insert_video(&id, owner_id, title, "description", "/media/video", "/media/thumb")
        .unwrap();
    id
}

pub fn seed_comment(db: &Database, video_id: &str, owner_id: &str, content: &str) -> String {
    let id = ObjectId::new().to_string();
    db.insert_comment(&id, video_id, owner_id, content).unwrap();
    id
}

pub fn seed_tweet(db: &Database, owner_id: &str, content: &str) -> String {
    let id = ObjectId::new().to_string();
    db.insert_tweet(&id, owner_id, content).unwrap();
    id
}

pub fn seed_playlist(db: &Database, owner_id: &str, name: &str) -> String {
    let id = ObjectId::new().to_string();
    db.insert_playlist(&id, owner_id, name, "description").unwrap();
    id
}
