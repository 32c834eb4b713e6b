//! Diesel schema for the SQLite database.
//!
//! Kept by hand and in step with the embedded migrations. Timestamps are
//! stored as naive UTC (`Timestamp`); the notification cursor is a float
//! epoch-second column so notification ordering survives serialisation to
//! polling clients unchanged.

diesel::table! {
    /// Registered users, their credentials, and API token state.
    users (id) {
        id -> Integer,
        username -> Text,
        email -> Text,
        password_hash -> Text,
        about_me -> Nullable<Text>,
        last_seen -> Nullable<Timestamp>,
        last_message_read_time -> Nullable<Timestamp>,
        api_token -> Nullable<Text>,
        api_token_expiration -> Nullable<Timestamp>,
    }
}

diesel::table! {
    /// Published status posts.
    posts (id) {
        id -> Integer,
        user_id -> Integer,
        body -> Text,
        timestamp -> Timestamp,
        language -> Nullable<Text>,
    }
}

diesel::table! {
    /// Directed follow edges; the composite key forbids duplicate edges.
    followers (follower_id, followed_id) {
        follower_id -> Integer,
        followed_id -> Integer,
    }
}

diesel::table! {
    /// Private messages between users.
    messages (id) {
        id -> Integer,
        sender_id -> Integer,
        recipient_id -> Integer,
        body -> Text,
        timestamp -> Timestamp,
    }
}

diesel::table! {
    /// Per-user notification ledger; at most one live row per name.
    notifications (id) {
        id -> Integer,
        name -> Text,
        user_id -> Integer,
        timestamp -> Double,
        payload_json -> Text,
    }
}

diesel::table! {
    /// Background task records keyed by the runner's job id.
    tasks (id) {
        id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        user_id -> Integer,
        complete -> Bool,
    }
}

diesel::joinable!(posts -> users (user_id));
diesel::joinable!(notifications -> users (user_id));
diesel::joinable!(tasks -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    posts,
    followers,
    messages,
    notifications,
    tasks,
);
