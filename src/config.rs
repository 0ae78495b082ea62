use clap::{App, Arg, ArgMatches};
use failure::{bail, Error};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub bind: String,
    pub db_threads: usize,
}

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("eggbbs")
        .about("A small bulletin board")
        .arg(Arg::with_name("database")
             .short("d")
             .long("database")
             .env("DATABASE_URL")
             .default_value("bbs.db")
             .help("SQLite database file")
             .takes_value(true))
        .arg(Arg::with_name("uploads")
             .short("u")
             .long("uploads")
             .env("UPLOAD_DIR")
             .default_value("static/uploads")
             .help("Directory that uploaded images are written to")
             .takes_value(true))
        .arg(Arg::with_name("bind")
             .short("b")
             .long("bind")
             .env("BIND_ADDR")
             .default_value("127.0.0.1:8080")
             .help("Address to listen on")
             .takes_value(true))
        .arg(Arg::with_name("db-threads")
             .long("db-threads")
             .env("DB_THREADS")
             .default_value("3")
             .help("Number of database executor threads")
             .takes_value(true))
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Result<Config, Error> {
        let database_url = matches.value_of("database").unwrap_or_default().trim().to_string();
        if database_url.is_empty() {
            bail!("database must not be empty");
        }

        let bind = matches.value_of("bind").unwrap_or_default().trim().to_string();
        if bind.is_empty() {
            bail!("bind address must not be empty");
        }

        let threads = matches.value_of("db-threads").unwrap_or_default();
        let db_threads = match threads.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => bail!("db-threads must be a positive integer, got {:?}", threads),
        };

        Ok(Config {
            database_url: database_url,
            upload_dir: PathBuf::from(matches.value_of("uploads").unwrap_or_default()),
            bind: bind,
            db_threads: db_threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, Error> {
        let mut argv = vec!["eggbbs"];
        argv.extend_from_slice(args);
        let matches = app().get_matches_from_safe(argv)?;
        Config::from_matches(&matches)
    }

    #[test]
    fn flags_are_read() {
        let config = parse(&[
            "--database", "/tmp/x.db",
            "--uploads", "/tmp/uploads",
            "--bind", "0.0.0.0:9000",
            "--db-threads", "8",
        ]).unwrap();

        assert_eq!(config.database_url, "/tmp/x.db");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/uploads"));
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.db_threads, 8);
    }

    #[test]
    fn short_flags_are_read() {
        let config = parse(&["-d", "a.db", "-u", "up", "-b", "[::1]:80", "--db-threads", "1"]).unwrap();

        assert_eq!(config.database_url, "a.db");
        assert_eq!(config.upload_dir, PathBuf::from("up"));
        assert_eq!(config.bind, "[::1]:80");
    }

    #[test]
    fn thread_count_must_be_positive() {
        assert!(parse(&["-d", "a.db", "-b", "x:1", "--db-threads", "0"]).is_err());
        assert!(parse(&["-d", "a.db", "-b", "x:1", "--db-threads", "many"]).is_err());
    }

    #[test]
    fn blank_database_is_rejected() {
        assert!(parse(&["-d", "  ", "-b", "x:1", "--db-threads", "2"]).is_err());
    }
}
