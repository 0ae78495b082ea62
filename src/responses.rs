use chrono::prelude::*;
use serde_derive::Serialize;

use crate::models::{Board, Post};

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i32,
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub date: NaiveDateTime,
}

/// One board together with its posts, newest first.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub board: BoardResponse,
    pub posts: Vec<PostResponse>,
}

impl From<Board> for BoardResponse {
    fn from(board: Board) -> Self {
        BoardResponse {
            id: board.id,
            title: board.title,
            description: board.description,
            created_at: board.created_at,
        }
    }
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        PostResponse {
            id: post.id,
            name: post.name,
            message: post.message,
            image: post.image,
            date: post.date,
        }
    }
}

impl FeedResponse {
    pub fn new(board: Board, posts: Vec<Post>) -> Self {
        FeedResponse {
            board: board.into(),
            posts: posts.into_iter().map(PostResponse::from).collect(),
        }
    }
}
