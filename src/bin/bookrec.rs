//! Command-line front end for the book recommendation core.
//!
//! Usage:
//!   bookrec genres
//!   bookrec list [--genre G] [--min-year Y] [--max-year Y] [--min-popularity P]
//!                [--max-ranking R] [--min-heat H] [--limit N]
//!   bookrec pick [GENRE]
//!   bookrec refresh
//!
//! Global flags:
//!   --config <FILE>   read settings from FILE instead of the default path
//!   --verbose, -v     debug logging

use std::path::{Path, PathBuf};

use bookrec::{BookFilter, BookRecommender, Config, Error};

fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let verbose = take_flag(&mut args, "--verbose") || take_flag(&mut args, "-v");
    let config_path = take_value(&mut args, "--config").map(PathBuf::from);

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    let command = match args.first() {
        Some(c) => c.clone(),
        None => {
            usage();
            std::process::exit(2);
        }
    };

    let config = load_config(config_path.as_deref());

    match command.as_str() {
        "genres" => cmd_genres(config),
        "list" => cmd_list(config, &args[1..]),
        "pick" => cmd_pick(config, args.get(1).map(|s| s.as_str())),
        "refresh" => cmd_refresh(config),
        _ => {
            eprintln!("Unknown command: {}", command);
            usage();
            std::process::exit(2);
        }
    }
}

fn cmd_genres(config: Config) {
    let rec = BookRecommender::new(config);
    let genres = rec.available_genres();

    println!("=== Available Genres ({}) ===", genres.len());
    for genre in genres {
        println!("  {}", genre);
    }
}

fn cmd_list(config: Config, args: &[String]) {
    let filter = match parse_filter(args) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Invalid filter: {}", e);
            std::process::exit(2);
        }
    };

    let rec = BookRecommender::new(config);
    let books = rec.filter_books(&filter);

    println!("=== Books ({}) ===", books.len());
    for (i, book) in books.iter().enumerate() {
        let year = book.year.map_or("Unknown".to_string(), |y| y.to_string());
        let popularity = book
            .popularity
            .map_or("Not rated".to_string(), |p| format!("{:.1}", p));
        let ranking = book
            .ranking
            .map_or("Not ranked".to_string(), |r| format!("#{}", r));
        let score = book
            .composite_score
            .map_or("-".to_string(), |s| format!("{:.1}", s));

        println!(
            "  {:>3}. {} - {} ({}) [{}] pop={} rank={} score={}",
            i + 1,
            book.title,
            book.author,
            year,
            book.genre,
            popularity,
            ranking,
            score
        );
    }
}

fn cmd_pick(config: Config, genre: Option<&str>) {
    let rec = BookRecommender::new(config);

    match rec.get_random_book(genre) {
        Some(book) => {
            println!("=== Your Random Book ===");
            println!("Title:      {}", book.title);
            println!("Author:     {}", book.author);
            println!("Genre:      {}", book.genre);
            println!("Year:       {}", book.year);
            println!("Popularity: {}", book.popularity);
            println!("Ranking:    {}", book.ranking);
            println!("Heat:       {}", book.heat_index);
            if let Some(url) = &book.cover_url {
                println!("Cover:      {}", url);
            }
            if let Some(url) = &book.open_library_url {
                println!("Details:    {}", url);
            }
        }
        None => match genre {
            Some(g) => println!("No books found for genre {}", g),
            None => println!("No books found"),
        },
    }
}

fn cmd_refresh(mut config: Config) {
    // Expiry zero invalidates any existing artifact, so construction always
    // fetches fresh data and persists it.
    config.cache_expiry_days = 0;
    let rec = BookRecommender::new(config);

    println!(
        "=== Refreshed: {} books across {} genres ===",
        rec.books().len(),
        rec.available_genres().len()
    );
}

/// Convert `--key value` pairs into a typed filter; malformed bounds are
/// rejected before any data is loaded.
fn parse_filter(args: &[String]) -> Result<BookFilter, Error> {
    let mut filter = BookFilter::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let key = match arg.strip_prefix("--") {
            Some(k) => k,
            None => {
                return Err(Error::InvalidFilter(format!(
                    "unexpected argument: {}",
                    arg
                )));
            }
        };
        let value = iter
            .next()
            .ok_or_else(|| Error::InvalidFilter(format!("--{} requires a value", key)))?;
        filter.set(key, value)?;
    }

    filter.validate()?;
    Ok(filter)
}

fn load_config(path: Option<&Path>) -> Config {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match Config::default_path() {
            Some(p) => p,
            None => return Config::default(),
        },
    };

    match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Bad config {}: {}", path.display(), e);
            std::process::exit(2);
        }
    }
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    if let Some(idx) = args.iter().position(|a| a == flag) {
        args.remove(idx);
        true
    } else {
        false
    }
}

fn take_value(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    if idx + 1 >= args.len() {
        eprintln!("{} requires a value", flag);
        std::process::exit(2);
    }
    let value = args.remove(idx + 1);
    args.remove(idx);
    Some(value)
}

fn usage() {
    eprintln!("Usage:");
    eprintln!("  bookrec genres");
    eprintln!("  bookrec list [--genre G] [--min-year Y] [--max-year Y] [--min-popularity P]");
    eprintln!("               [--max-ranking R] [--min-heat H] [--limit N]");
    eprintln!("  bookrec pick [GENRE]");
    eprintln!("  bookrec refresh");
    eprintln!();
    eprintln!("Global flags: --config <FILE>, --verbose");
}
