use actix::prelude::*;

use crate::errors::BbsError;
use crate::models::{Board, Post};

pub struct ListBoards;

impl Message for ListBoards {
    type Result = Result<Vec<Board>, BbsError>;
}

pub struct CreateBoard {
    pub title: String,
    pub description: String,
}

impl Message for CreateBoard {
    type Result = Result<Option<i32>, BbsError>;
}

pub struct DeleteBoard {
    pub board_id: i32,
}

impl Message for DeleteBoard {
    type Result = Result<bool, BbsError>;
}

pub struct FindBoard {
    pub board_id: i32,
}

impl Message for FindBoard {
    type Result = Result<Board, BbsError>;
}

pub struct ListPosts {
    pub board_id: i32,
}

impl Message for ListPosts {
    type Result = Result<(Board, Vec<Post>), BbsError>;
}

/// An image field as received: the client's file name and the raw bytes.
pub struct ImageUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

pub struct MakePost {
    pub board_id: i32,
    pub name: String,
    pub message: String,
    pub image: Option<ImageUpload>,
}

impl Message for MakePost {
    type Result = Result<Option<i32>, BbsError>;
}
