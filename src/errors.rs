use actix::MailboxError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::result::{ConnectionError, Error as DieselError};
use failure::Fail;
use std::io;

#[derive(Debug, Fail)]
pub enum BbsError {
    #[fail(display = "Board not found")]
    BoardNotFound,
    #[fail(display = "{}", _0)]
    BadRequest(String),
    #[fail(display = "Upload too large")]
    UploadTooLarge,
    #[fail(display = "Upload rejected: {}", _0)]
    UploadRejected(String),
    #[fail(display = "Could not open database: {}", _0)]
    Connection(#[cause] ConnectionError),
    #[fail(display = "Database error: {}", _0)]
    Database(#[cause] DieselError),
    #[fail(display = "Connection pool error: {}", _0)]
    Pool(#[cause] r2d2::Error),
    #[fail(display = "I/O error: {}", _0)]
    Io(#[cause] io::Error),
    #[fail(display = "Database executor unavailable: {}", _0)]
    Mailbox(MailboxError),
}

impl From<DieselError> for BbsError {
    fn from(e: DieselError) -> Self {
        BbsError::Database(e)
    }
}

impl From<ConnectionError> for BbsError {
    fn from(e: ConnectionError) -> Self {
        BbsError::Connection(e)
    }
}

impl From<r2d2::Error> for BbsError {
    fn from(e: r2d2::Error) -> Self {
        BbsError::Pool(e)
    }
}

impl From<io::Error> for BbsError {
    fn from(e: io::Error) -> Self {
        BbsError::Io(e)
    }
}

impl From<MailboxError> for BbsError {
    fn from(e: MailboxError) -> Self {
        BbsError::Mailbox(e)
    }
}

impl ResponseError for BbsError {
    fn status_code(&self) -> StatusCode {
        match self {
            BbsError::BoardNotFound => StatusCode::NOT_FOUND,
            BbsError::BadRequest(_) | BbsError::UploadRejected(_) => StatusCode::BAD_REQUEST,
            BbsError::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = if status.is_server_error() {
            error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}
