use actix::Addr;
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures::StreamExt;
use serde_derive::Deserialize;

use crate::db::DbExecutor;
use crate::errors::BbsError;
use crate::messages::*;
use crate::responses::*;
use crate::upload::MAX_UPLOAD_BYTES;

/// Shared by every worker; the only handle the handlers have on storage.
pub struct AppState {
    pub db: Addr<DbExecutor>,
}

#[derive(Deserialize)]
pub struct BoardForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Fields of a post sent as `application/x-www-form-urlencoded`, which cannot carry an image.
#[derive(Deserialize)]
pub struct PostFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Default)]
struct PostForm {
    name: String,
    message: String,
    image: Option<ImageUpload>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(list_boards))
        .route("/create_board", web::post().to(create_board))
        .route("/delete_board/{board_id}", web::post().to(delete_board))
        .service(
            web::resource("/board/{board_id}")
                .route(web::get().to(show_board))
                .route(web::post().to(post_to_board)),
        );
}

async fn list_boards(state: web::Data<AppState>) -> Result<HttpResponse, BbsError> {
    let boards = state.db.send(ListBoards).await??;

    let boards: Vec<BoardResponse> = boards.into_iter().map(BoardResponse::from).collect();
    Ok(HttpResponse::Ok().json(boards))
}

async fn create_board(state: web::Data<AppState>, form: web::Form<BoardForm>) -> Result<HttpResponse, BbsError> {
    let form = form.into_inner();

    state.db.send(CreateBoard {
        title: form.name,
        description: form.description,
    }).await??;

    Ok(redirect_home())
}

async fn delete_board(state: web::Data<AppState>, board_id: web::Path<i32>) -> Result<HttpResponse, BbsError> {
    state.db.send(DeleteBoard {
        board_id: board_id.into_inner(),
    }).await??;

    Ok(redirect_home())
}

async fn show_board(state: web::Data<AppState>, board_id: web::Path<i32>) -> Result<HttpResponse, BbsError> {
    render_feed(&state, board_id.into_inner()).await
}

async fn post_to_board(
    state: web::Data<AppState>,
    req: HttpRequest,
    board_id: web::Path<i32>,
    payload: web::Payload,
) -> Result<HttpResponse, BbsError> {
    let board_id = board_id.into_inner();

    // A missing board is reported before the body is looked at.
    state.db.send(FindBoard { board_id }).await??;

    let form = if req.content_type() == "application/x-www-form-urlencoded" {
        let mut payload = payload.into_inner();
        let fields = web::Form::<PostFields>::from_request(&req, &mut payload)
            .await
            .map_err(|e| BbsError::BadRequest(format!("Could not parse form data: {}", e)))?
            .into_inner();
        PostForm {
            name: fields.name,
            message: fields.message,
            image: None,
        }
    } else {
        read_post_form(&mut Multipart::new(req.headers(), payload)).await?
    };

    state.db.send(MakePost {
        board_id: board_id,
        name: form.name,
        message: form.message,
        image: form.image,
    }).await??;

    render_feed(&state, board_id).await
}

async fn render_feed(state: &AppState, board_id: i32) -> Result<HttpResponse, BbsError> {
    let (board, posts) = state.db.send(ListPosts { board_id }).await??;
    Ok(HttpResponse::Ok().json(FeedResponse::new(board, posts)))
}

fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

async fn read_post_form(payload: &mut Multipart) -> Result<PostForm, BbsError> {
    let mut form = PostForm::default();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(bad_multipart)?;
        let disposition = field.content_disposition().clone();

        match disposition.get_name().unwrap_or("") {
            "name" => {
                form.name = read_text(&mut field).await?;
            },
            "message" => {
                form.message = read_text(&mut field).await?;
            },
            "image" => {
                let data = read_field(&mut field).await?;
                // Browsers send an empty file part when nothing was picked.
                match disposition.get_filename() {
                    Some(filename) if !filename.is_empty() => {
                        form.image = Some(ImageUpload {
                            filename: filename.to_string(),
                            data: data,
                        });
                    },
                    _ => {},
                }
            },
            _ => {
                read_field(&mut field).await?;
            },
        }
    }

    Ok(form)
}

async fn read_text(field: &mut Field) -> Result<String, BbsError> {
    let buf = read_field(field).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>, BbsError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(bad_multipart)?;
        if buf.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(BbsError::UploadTooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn bad_multipart(e: MultipartError) -> BbsError {
    BbsError::BadRequest(format!("Could not parse multipart data: {}", e))
}
