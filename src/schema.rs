table! {
    boards (id) {
        id -> Integer,
        title -> Text,
        description -> Text,
        created_at -> Timestamp,
    }
}

table! {
    posts (id) {
        id -> Integer,
        board_id -> Integer,
        name -> Text,
        message -> Text,
        image -> Nullable<Text>,
        date -> Timestamp,
    }
}

joinable!(posts -> boards (board_id));

allow_tables_to_appear_in_same_query!(
    boards,
    posts,
);

/// Run against every fresh database; every statement is idempotent.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS boards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMP NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    board_id INTEGER NOT NULL REFERENCES boards (id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    message TEXT NOT NULL,
    image TEXT,
    date TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_board_date ON posts (board_id, date);
";
