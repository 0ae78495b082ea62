#[macro_use] extern crate prettytable;
use prettytable::Table;

use clap::{value_t, App, AppSettings, Arg, SubCommand};

use eggbbs::db;
use eggbbs::errors::BbsError;

use std::process::exit;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn main() {
    let _ = dotenv::dotenv();

    let matches = App::new("bbs-ctl")
        .arg(Arg::with_name("database")
             .short("d")
             .long("database")
             .env("DATABASE_URL")
             .default_value("bbs.db")
             .help("Specify the SQLite database file")
             .takes_value(true))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(SubCommand::with_name("list-boards")
                    .about("Lists boards in the database"))
        .subcommand(SubCommand::with_name("list-posts")
                    .about("Lists posts on a given board")
                    .arg(Arg::with_name("board")
                         .short("b")
                         .long("board")
                         .takes_value(true)
                         .required(true)))
        .subcommand(SubCommand::with_name("create-board")
                    .about("Creates a board")
                    .arg(Arg::with_name("title")
                         .short("t")
                         .long("title")
                         .takes_value(true)
                         .required(true))
                    .arg(Arg::with_name("description")
                         .long("description")
                         .takes_value(true)))
        .subcommand(SubCommand::with_name("delete-board")
                    .about("Deletes a board and every post on it")
                    .arg(Arg::with_name("board")
                         .short("b")
                         .long("board")
                         .takes_value(true)
                         .required(true)))
        .get_matches();

    let db_url = matches.value_of("database").unwrap_or("bbs.db");

    let mut conn = match db::establish(db_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        },
    };

    match matches.subcommand() {
        ("list-boards", _) => {
            match db::list_boards(&mut conn) {
                Ok(boards) => {
                    let mut table = Table::new();
                    table.add_row(row!["ID", "Title", "Description", "Created"]);
                    for board in boards {
                        let created = board.created_at.format(TIME_FORMAT).to_string();
                        table.add_row(row![board.id, board.title, board.description, created]);
                    }
                    table.printstd();
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                },
            }
        },
        ("list-posts", Some(post_matches)) => {
            let board = value_t!(post_matches, "board", i32).unwrap_or_else(|e| e.exit());

            match db::list_posts(&mut conn, board) {
                Ok((board, posts)) => {
                    println!("{} ({})", board.title, board.id);
                    let mut table = Table::new();
                    table.add_row(row!["ID", "Name", "Message", "Image", "Date"]);
                    for post in posts {
                        let image = post.image.unwrap_or_default();
                        let date = post.date.format(TIME_FORMAT).to_string();
                        table.add_row(row![post.id, post.name, post.message, image, date]);
                    }
                    table.printstd();
                },
                Err(BbsError::BoardNotFound) => {
                    eprintln!("Board not found");
                    exit(1);
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                },
            }
        },
        ("create-board", Some(create_matches)) => {
            let title = create_matches.value_of("title").unwrap_or_default();
            let description = create_matches.value_of("description").unwrap_or_default();

            match db::create_board(&mut conn, title, description) {
                Ok(Some(id)) => println!("Created board {}", id),
                Ok(None) => {
                    eprintln!("Board title must not be empty");
                    exit(1);
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                },
            }
        },
        ("delete-board", Some(delete_matches)) => {
            let board = value_t!(delete_matches, "board", i32).unwrap_or_else(|e| e.exit());

            match db::delete_board(&mut conn, board) {
                Ok(true) => println!("Deleted board {}", board),
                Ok(false) => println!("No board with id {}", board),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                },
            }
        },
        _ => unreachable!(),
    }
}
