use chrono::prelude::*;
use diesel::prelude::*;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = boards)]
pub struct Board {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = boards)]
pub struct BoardInsert<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id: i32,
    pub board_id: i32,
    pub name: String,
    pub message: String,
    pub image: Option<String>,
    pub date: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = posts)]
pub struct PostInsert {
    pub board_id: i32,
    pub name: String,
    pub message: String,
    pub image: Option<String>,
    pub date: NaiveDateTime,
}
