// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod parser;
pub mod utils;

use anyhow::{anyhow, Error};
use clap::{App, Arg};
use config::Config;
use controller::{Controller, Entity, SearchBy, ToTable};
use engine::Engine;
use parser::{Database, Statement};
use ratings_memory::MemoryController;
use ratings_pg::PgController;
use rustyline::Editor;
use simplelog::{SimpleLogger, TermLogger, TerminalMode};
use std::collections::HashMap;
use std::path::Path;

macro_rules! prompt {
    ($ed:ident) => {{
        prompt!($ed, "")
    }};

    ($ed:ident, $db:expr) => {{
        use rustyline::error::ReadlineError;

        let msg = if $db.is_empty() {
            format!("{}", PROMPT)
        } else {
            format!("({}) {}", $db, PROMPT)
        };

        match $ed.readline(&msg) {
            Ok(line) => {
                $ed.add_history_entry(line.as_str());
                Ok(line)
            }

            Err(ReadlineError::Interrupted) => {
                continue;
            }

            Err(ReadlineError::Eof) => {
                if $db.is_empty() {
                    println!("Exiting...Good bye!");
                } else {
                    println!("Disconnecting from {}", $db);
                }

                break;
            }

            Err(e) => Err(e),
        }
    }};
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">> ";

fn first<T>(found: Vec<T>, by: &SearchBy) -> Result<T, Error> {
    found
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Nothing found with {}", by))
}

fn run_statement<C>(
    controller: &C,
    engine: &Engine<'_, C>,
    rl: &mut Editor<()>,
    statement: Statement,
) -> Result<(), Error>
where
    C: Controller,
{
    let find_user = |by: &SearchBy| first(controller.users_by(by)?, by);
    let find_movie = |by: &SearchBy| first(controller.movies_by(by)?, by);

    match statement {
        Statement::Connect(_) => println!("Already connected, disconnect first!"),

        Statement::QueryUser(by) => {
            for user in controller.users_by(&by)? {
                println!("{}", user.to_table());
            }
        }

        Statement::QueryMovie(by) => {
            for movie in controller.movies_by(&by)? {
                println!("{}", movie.to_table());
            }
        }

        Statement::QueryRatings(by) => {
            let user = find_user(&by)?;
            let ratings = controller.ratings_by_user(&user.get_id())?;

            if ratings.is_empty() {
                println!("No ratings found for user({})", user.get_id());
            } else {
                println!("{}", ratings.to_table());
            }
        }

        Statement::QueryRaters(by) => {
            let movie = find_movie(&by)?;
            let ratings = controller.ratings_for_movie(&movie.get_id())?;

            if ratings.is_empty() {
                println!("No ratings found for movie({})", movie.get_id());
            } else {
                println!("{}", ratings.to_table());
            }
        }

        Statement::Similarity(a, b) => {
            let (user_a, user_b) = (find_user(&a)?, find_user(&b)?);

            match engine.user_similarity(&user_a, &user_b)? {
                Some(similarity) => println!("Similarity is {}", similarity),
                None => println!("Not enough common ratings to compare them"),
            }
        }

        Statement::Predict(user, movie) => {
            let (user, movie) = (find_user(&user)?, find_movie(&movie)?);

            match engine.predict_rating(&user, &movie)? {
                Some(predicted) => println!("Predicted score is {:.3}", predicted),
                None => println!("No prediction available"),
            }
        }

        Statement::Neighbors(user, movie) => {
            let (user, movie) = (find_user(&user)?, find_movie(&movie)?);
            let neighbors = engine.neighbors(&user, &movie)?;

            if neighbors.is_empty() {
                println!("No similar user rated movie({})", movie.get_id());
            }

            for neighbor in neighbors {
                println!(
                    "user({}) similarity {:.4}, scored {}",
                    neighbor.id, neighbor.similarity, neighbor.score
                );
            }
        }

        Statement::Rate(user, movie, score) => {
            let (user, movie) = (find_user(&user)?, find_movie(&movie)?);
            let rating = controller.insert_rating(&user.get_id(), &movie.get_id(), score)?;
            println!("{}", rating.to_table());
        }

        Statement::Unrate(user, movie) => {
            let (user, movie) = (find_user(&user)?, find_movie(&movie)?);
            let rating = controller.remove_rating(&user.get_id(), &movie.get_id())?;
            println!("Removed rating({})", rating.get_id());
        }

        Statement::InsertUser => {
            let proto = utils::build_prototype(rl, controller.fields_for_users())?;
            println!("{}", controller.insert_user(proto)?.to_table());
        }

        Statement::InsertMovie => {
            let proto = utils::build_prototype(rl, controller.fields_for_movies())?;
            println!("{}", controller.insert_movie(proto)?.to_table());
        }
    }

    Ok(())
}

fn database_connected_prompt<C>(controller: C, name: &str, config: &Config) -> Result<(), Error>
where
    C: Controller,
{
    let engine = Engine::from_config(&controller, &config.engine);
    let mut rl = Editor::<()>::new();

    loop {
        let opt: String = prompt!(rl, name)?;

        match opt.trim() {
            "?" | "h" | "help" => {
                println!("Connected help:");
                println!("query_user(id(N))             Show an user, also email('..') or zipcode('..')");
                println!("query_movie(id(N))            Show a movie, also title('..')");
                println!("query_ratings(id(N))          Scores given by an user");
                println!("query_raters(id(N))           Scores received by a movie");
                println!("similarity(id(A), id(B))      Pearson similarity between two users");
                println!("predict(id(U), id(M))         Predict the score of an user for a movie");
                println!("neighbors(id(U), id(M))       Users taken into account by predict");
                println!("rate(id(U), id(M), S)         Rate a movie");
                println!("unrate(id(U), id(M))          Remove a rating");
                println!("insert_user | insert_movie    Insert a new entity");
                println!("d | disconnect                Disconnect");
            }

            "q" | "quit" | "d" | "disconnect" => {
                println!("Disconnecting from database {}", name);
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(statement) => {
                    if let Err(e) = run_statement(&controller, &engine, &mut rl, statement) {
                        println!("{}", e);
                    }
                }

                None => println!("Invalid syntax"),
            },
        }
    }

    Ok(())
}

fn connect(database: Database, config: &Config) -> Result<(), Error> {
    match database {
        Database::Postgres => {
            database_connected_prompt(PgController::from_config(config)?, "postgres", config)
        }

        Database::Memory => {
            let seed_dir = Path::new(&config.database.seed_dir);
            let controller = if seed_dir.is_dir() {
                MemoryController::from_seed(seed_dir)?
            } else {
                log::warn!("No seed found at {}, starting empty", seed_dir.display());
                MemoryController::new()
            };

            database_connected_prompt(controller, "memory", config)
        }
    }
}

fn init_logger(level: &str, verbose: bool) -> Result<(), Error> {
    let level = utils::log_level(level, verbose);

    if TermLogger::init(level, simplelog::Config::default(), TerminalMode::Mixed).is_err() {
        SimpleLogger::init(level, simplelog::Config::default())
            .map_err(|e| anyhow!("Couldn't initialize logger: {}", e))?;
    }

    Ok(())
}

fn main() -> Result<(), Error> {
    let matches = App::new("movie-ratings")
        .version(VERSION)
        .about("Query movie ratings and predict scores")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log debug messages"),
        )
        .get_matches();

    let mut config = match matches.value_of("config") {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    init_logger(&config.log.level, matches.is_present("verbose"))?;

    let vars: HashMap<String, String> = dotenv::vars().collect();
    if let Some(url) = vars.get("DATABASE_URL") {
        log::debug!("Using DATABASE_URL from the environment");
        config.database.psql_url = url.clone();
    }

    println!("Welcome to movie-ratings {}", VERSION);
    let mut rl = Editor::<()>::new();

    loop {
        let opt: String = prompt!(rl)?;

        match opt.trim() {
            "?" | "h" | "help" => {
                println!("Main help:");
                println!("h | help                      Shows this help");
                println!("q | quit                      Quit");
                println!("connect(postgres|memory)      Connect to a database");
            }

            "q" | "quit" => {
                println!("Bye!");
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(Statement::Connect(database)) => {
                    if let Err(e) = connect(database, &config) {
                        println!("{}", e);
                    }
                }

                Some(_) => println!("Invalid statement in this context!"),
                None => println!("Invalid syntax!"),
            },
        }
    }

    Ok(())
}
