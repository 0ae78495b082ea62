use actix::prelude::*;
use chrono::prelude::*;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use r2d2::Pool;
use std::path::{Path, PathBuf};

use crate::errors::BbsError;
use crate::messages::*;
use crate::models::{Board, BoardInsert, Post, PostInsert};
use crate::schema::{self, boards, posts};
use crate::upload;

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Name recorded for posts submitted without one.
pub const DEFAULT_NAME: &str = "anonymous";

const PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Opens the pool and creates any missing tables.
pub fn init_pool(url: &str) -> Result<SqlitePool, BbsError> {
    let manager = ConnectionManager::<SqliteConnection>::new(url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)?;

    let mut conn = pool.get()?;
    conn.batch_execute(schema::CREATE_TABLES)?;

    Ok(pool)
}

/// Opens a single connection, for tools that do not need a pool.
pub fn establish(url: &str) -> Result<SqliteConnection, BbsError> {
    let mut conn = SqliteConnection::establish(url)?;
    conn.batch_execute(PRAGMAS)?;
    conn.batch_execute(schema::CREATE_TABLES)?;
    Ok(conn)
}

pub fn list_boards(conn: &mut SqliteConnection) -> QueryResult<Vec<Board>> {
    boards::table
        .select(Board::as_select())
        .order((boards::created_at.desc(), boards::id.desc()))
        .load(conn)
}

pub fn find_board(conn: &mut SqliteConnection, board_id: i32) -> QueryResult<Option<Board>> {
    boards::table
        .find(board_id)
        .select(Board::as_select())
        .first(conn)
        .optional()
}

/// Inserts a board unless the trimmed title is empty, in which case nothing happens.
pub fn create_board(conn: &mut SqliteConnection, title: &str, description: &str) -> QueryResult<Option<i32>> {
    let title = title.trim();
    if title.is_empty() {
        debug!("ignoring board with an empty title");
        return Ok(None);
    }

    let new_board = BoardInsert {
        title: title,
        description: description,
        created_at: Utc::now().naive_utc(),
    };

    // INSERT INTO boards (title, description, created_at) VALUES (...) RETURNING id;
    let id: i32 =
        diesel::insert_into(boards::table)
        .values(&new_board)
        .returning(boards::id)
        .get_result(conn)?;

    info!("created board {} {:?}", id, title);
    Ok(Some(id))
}

/// Removes a board and its posts in one transaction. Returns false if there was no such board.
pub fn delete_board(conn: &mut SqliteConnection, board_id: i32) -> QueryResult<bool> {
    let (boards_removed, posts_removed) = conn.transaction::<_, DieselError, _>(|conn| {
        let posts_removed =
            diesel::delete(posts::table.filter(posts::board_id.eq(board_id)))
            .execute(conn)?;
        let boards_removed =
            diesel::delete(boards::table.find(board_id))
            .execute(conn)?;
        Ok((boards_removed, posts_removed))
    })?;

    if boards_removed > 0 {
        info!("deleted board {} with {} posts", board_id, posts_removed);
    }
    Ok(boards_removed > 0)
}

/// Fetches a board and its posts, newest first.
pub fn list_posts(conn: &mut SqliteConnection, board_id: i32) -> Result<(Board, Vec<Post>), BbsError> {
    let board = find_board(conn, board_id)?.ok_or(BbsError::BoardNotFound)?;

    let posts =
        posts::table
        .select(Post::as_select())
        .filter(posts::board_id.eq(board_id))
        .order((posts::date.desc(), posts::id.desc()))
        .load(conn)?;

    Ok((board, posts))
}

/// Stores a post and its image.
///
/// Returns `Ok(None)` when the message is blank and the post was dropped. Runs in an immediate
/// transaction, so a concurrent board deletion waits until the post is in. The board is looked
/// up before anything touches the upload directory, and the image name is only recorded once
/// the file has been written.
pub fn create_post(conn: &mut SqliteConnection, upload_dir: &Path, msg: MakePost) -> Result<Option<i32>, BbsError> {
    conn.immediate_transaction::<_, BbsError, _>(|conn| {
        if find_board(conn, msg.board_id)?.is_none() {
            return Err(BbsError::BoardNotFound);
        }

        if msg.message.trim().is_empty() {
            debug!("dropping post with an empty message on board {}", msg.board_id);
            return Ok(None);
        }

        let image = match msg.image {
            Some(upload) => match upload::accepted_name(&upload.filename) {
                Some(name) => Some(upload::store(upload_dir, &name, &upload.data)?),
                None => {
                    warn!("ignoring upload {:?}: extension not allowed", upload.filename);
                    None
                },
            },
            None => None,
        };

        let new_post = PostInsert {
            board_id: msg.board_id,
            name: resolve_name(&msg.name),
            message: msg.message,
            image: image,
            date: Utc::now().naive_utc(),
        };

        let post_id = insert_post(conn, &new_post)?;
        info!("created post {} on board {}", post_id, new_post.board_id);
        Ok(Some(post_id))
    })
}

// A foreign key failure means the board went away underneath us.
fn insert_post(conn: &mut SqliteConnection, new_post: &PostInsert) -> Result<i32, BbsError> {
    diesel::insert_into(posts::table)
        .values(new_post)
        .returning(posts::id)
        .get_result(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => BbsError::BoardNotFound,
            e => BbsError::Database(e),
        })
}

fn resolve_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name.to_string()
    }
}

pub struct DbExecutor {
    pool: SqlitePool,
    upload_dir: PathBuf,
}

impl DbExecutor {
    pub fn new(pool: SqlitePool, upload_dir: PathBuf) -> Self {
        DbExecutor { pool, upload_dir }
    }
}

impl Actor for DbExecutor {
    type Context = SyncContext<Self>;
}

impl Handler<ListBoards> for DbExecutor {
    type Result = Result<Vec<Board>, BbsError>;

    fn handle(&mut self, _msg: ListBoards, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        Ok(list_boards(&mut conn)?)
    }
}

impl Handler<CreateBoard> for DbExecutor {
    type Result = Result<Option<i32>, BbsError>;

    fn handle(&mut self, msg: CreateBoard, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        Ok(create_board(&mut conn, &msg.title, &msg.description)?)
    }
}

impl Handler<DeleteBoard> for DbExecutor {
    type Result = Result<bool, BbsError>;

    fn handle(&mut self, msg: DeleteBoard, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        Ok(delete_board(&mut conn, msg.board_id)?)
    }
}

impl Handler<FindBoard> for DbExecutor {
    type Result = Result<Board, BbsError>;

    fn handle(&mut self, msg: FindBoard, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        find_board(&mut conn, msg.board_id)?.ok_or(BbsError::BoardNotFound)
    }
}

impl Handler<ListPosts> for DbExecutor {
    type Result = Result<(Board, Vec<Post>), BbsError>;

    fn handle(&mut self, msg: ListPosts, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        list_posts(&mut conn, msg.board_id)
    }
}

impl Handler<MakePost> for DbExecutor {
    type Result = Result<Option<i32>, BbsError>;

    fn handle(&mut self, msg: MakePost, _: &mut Self::Context) -> Self::Result {
        let mut conn = self.pool.get()?;
        create_post(&mut conn, &self.upload_dir, msg)
    }
}
