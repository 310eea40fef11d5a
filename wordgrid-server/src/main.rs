use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use wordgrid_core::crossword::{CrosswordBoard, CrosswordGenerator, GeneratorConfig};
use wordgrid_core::io::{data_folder, list_dictionaries, source_path};
use wordgrid_core::pick::draw_words_biased;
use wordgrid_core::store::cache::CachedWordStore;
use wordgrid_core::store::memory::MemoryWordStore;
use wordgrid_core::store::{CandidateFilter, WordStore};
use wordgrid_core::tokenizer::{CancelFlag, Tokenizer};
use wordgrid_core::Error;

/// Words drawn per requested board word, so the engine has spares to place.
const POOL_FACTOR: usize = 3;

type Store = CachedWordStore<MemoryWordStore>;

/// Query parameters for `/v1/crossword`
#[derive(Deserialize)]
struct CrosswordQuery {
	dictionary: String,
	count: Option<usize>,
	min_len: Option<usize>,
}

#[derive(Deserialize)]
struct TokenizeQuery {
	dictionary: String,
	text: String,
}

#[derive(Deserialize)]
struct DictionaryQuery {
	names: Option<String>,
}

#[derive(Deserialize)]
struct SubmitQuery {
	x: i32,
	y: i32,
	letter: String,
}

#[derive(Deserialize)]
struct WordQuery {
	word: usize,
}

#[derive(Serialize)]
struct Progress {
	solved: bool,
	solved_count: usize,
	conceded_count: usize,
	words: usize,
}

impl Progress {
	fn of(board: &CrosswordBoard) -> Self {
		Self {
			solved: board.is_solved(),
			solved_count: board.solved_count(),
			conceded_count: board.conceded_count(),
			words: board.words().len(),
		}
	}
}

#[derive(Serialize)]
struct Hint {
	word: usize,
	hint: String,
}

/// State shared by every worker.
///
/// The store is swapped wholesale when dictionaries are reloaded, so
/// handlers clone the `Arc` and release the lock before awaiting on it.
struct SharedData {
	data_folder: PathBuf,
	store: Arc<Store>,
	board: CrosswordBoard,
	board_dictionary: Option<String>,
	/// Bumped every time `board` is replaced.
	generation: u64,
}

fn lock(data: &web::Data<Mutex<SharedData>>) -> Result<MutexGuard<'_, SharedData>, HttpResponse> {
	data.lock().map_err(|_| HttpResponse::InternalServerError().body("State lock failed"))
}

fn error_response(e: &Error) -> HttpResponse {
	match e {
		Error::UnknownDictionary(_) | Error::NoSuchCell { .. } | Error::NoSuchWord(_) => {
			HttpResponse::NotFound().body(e.to_string())
		}
		Error::LockedCell { .. } | Error::InvalidConfig(_) => HttpResponse::BadRequest().body(e.to_string()),
		_ => {
			warn!("Request failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/dictionaries`
///
/// Lists the dictionaries available in the data folder.
#[get("/v1/dictionaries")]
async fn get_dictionaries(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let folder = match lock(&data) {
		Ok(shared) => shared.data_folder.clone(),
		Err(response) => return response,
	};
	match list_dictionaries(&folder) {
		Ok(ids) => HttpResponse::Ok().json(ids),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list dictionaries"),
	}
}

#[get("/v1/loaded_dictionaries")]
async fn get_loaded_dictionaries(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	match lock(&data) {
		Ok(shared) => HttpResponse::Ok().json(shared.store.inner().dictionary_ids()),
		Err(response) => response,
	}
}

/// HTTP PUT endpoint `/v1/load_dictionaries?names=a,b`
///
/// Replaces the loaded dictionaries. The current board is kept; its hints
/// are fetched from whatever store is loaded when they are requested.
#[put("/v1/load_dictionaries")]
async fn put_dictionaries(data: web::Data<Mutex<SharedData>>, query: web::Query<DictionaryQuery>) -> impl Responder {
	let names: Vec<&str> = match &query.names {
		Some(s) if !s.trim().is_empty() => s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
		_ => return HttpResponse::BadRequest().body("Missing or empty dictionary name"),
	};

	let mut shared = match lock(&data) {
		Ok(shared) => shared,
		Err(response) => return response,
	};

	let mut store = MemoryWordStore::new();
	for name in names {
		if let Err(e) = store.load_dictionary(source_path(&shared.data_folder, name)) {
			return HttpResponse::InternalServerError().body(format!("Failed to load dictionary '{name}': {e}"));
		}
	}

	shared.store = Arc::new(CachedWordStore::new(store));
	HttpResponse::Ok().json(shared.store.inner().dictionary_ids())
}

/// HTTP GET endpoint `/v1/tokenize`
///
/// Splits `text` into lookup candidates, merging known compounds.
#[get("/v1/tokenize")]
async fn get_tokenized(data: web::Data<Mutex<SharedData>>, query: web::Query<TokenizeQuery>) -> impl Responder {
	let store = match lock(&data) {
		Ok(shared) => Arc::clone(&shared.store),
		Err(response) => return response,
	};

	let tokenizer = Tokenizer::new();
	match tokenizer
		.tokenize_with_compounds(&query.text, &*store, &query.dictionary, &CancelFlag::new())
		.await
	{
		Ok(segments) => HttpResponse::Ok().json(segments),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/crossword`
///
/// Draws words from a dictionary, generates a board and makes it the
/// session board.
#[get("/v1/crossword")]
async fn get_crossword(data: web::Data<Mutex<SharedData>>, query: web::Query<CrosswordQuery>) -> impl Responder {
	let count = query.count.unwrap_or(5);
	let min_len = query.min_len.unwrap_or(3);

	let mut config = GeneratorConfig::default();
	if let Err(e) = config.set_max_words(count) {
		return error_response(&e);
	}
	let generator = match CrosswordGenerator::new(config) {
		Ok(g) => g,
		Err(e) => return error_response(&e),
	};

	let store = match lock(&data) {
		Ok(shared) => Arc::clone(&shared.store),
		Err(response) => return response,
	};

	let filter = CandidateFilter { min_graphemes: min_len, ..CandidateFilter::default() };
	let mut pool = match store.list_candidate_words(&query.dictionary, &filter).await {
		Ok(pool) => pool,
		Err(e) => return error_response(&e),
	};
	let words = draw_words_biased(&mut pool, count.saturating_mul(POOL_FACTOR), &mut rand::rng());
	let board = generator.generate(&words);
	info!(
		"New crossword from '{}': {} words, {}x{}",
		query.dictionary,
		board.words().len(),
		board.width(),
		board.height()
	);

	let mut shared = match lock(&data) {
		Ok(shared) => shared,
		Err(response) => return response,
	};
	shared.board = board;
	shared.board_dictionary = Some(query.dictionary.clone());
	shared.generation += 1;
	HttpResponse::Ok().json(&shared.board)
}

#[put("/v1/crossword/submit")]
async fn put_submit(data: web::Data<Mutex<SharedData>>, query: web::Query<SubmitQuery>) -> impl Responder {
	let mut shared = match lock(&data) {
		Ok(shared) => shared,
		Err(response) => return response,
	};
	match shared.board.submit(query.x, query.y, &query.letter) {
		Ok(()) => HttpResponse::Ok().json(Progress::of(&shared.board)),
		Err(e) => error_response(&e),
	}
}

#[put("/v1/crossword/concede")]
async fn put_concede(data: web::Data<Mutex<SharedData>>, query: web::Query<WordQuery>) -> impl Responder {
	let mut shared = match lock(&data) {
		Ok(shared) => shared,
		Err(response) => return response,
	};
	match shared.board.concede(query.word) {
		Ok(()) => HttpResponse::Ok().json(Progress::of(&shared.board)),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/crossword/hint`
///
/// Returns the hint of a placed word, looked up in the dictionary the
/// board was drawn from.
#[get("/v1/crossword/hint")]
async fn get_hint(data: web::Data<Mutex<SharedData>>, query: web::Query<WordQuery>) -> impl Responder {
	let (store, mut board, dictionary, generation) = match lock(&data) {
		Ok(shared) => match &shared.board_dictionary {
			Some(dictionary) => {
				(Arc::clone(&shared.store), shared.board.clone(), dictionary.clone(), shared.generation)
			}
			None => return HttpResponse::NotFound().body("No crossword in progress"),
		},
		Err(response) => return response,
	};

	let hint = match board.request_hint(query.word, &*store, &dictionary).await {
		Ok(hint) => hint,
		Err(e) => return error_response(&e),
	};

	let mut shared = match lock(&data) {
		Ok(shared) => shared,
		Err(response) => return response,
	};
	if shared.generation == generation {
		if let Err(e) = shared.board.record_hint(query.word, &hint) {
			return error_response(&e);
		}
	}
	HttpResponse::Ok().json(Hint { word: query.word, hint })
}

/// Main entry point for the server.
///
/// # Notes
/// - `WORDGRID_BIND` sets the listen address (default `127.0.0.1:5000`).
/// - `WORDGRID_DATA` sets the dictionary folder (default `./data`); every
///   `.dat` file in it is loaded at startup.
/// - `RUST_LOG` controls log output (default `info`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let bind = env::var("WORDGRID_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
	let folder = data_folder(&env::var("WORDGRID_DATA").unwrap_or_else(|_| "./data".to_owned()));

	let store = match MemoryWordStore::from_folder(&folder.to_string_lossy()) {
		Ok(store) => store,
		Err(e) => {
			warn!("Starting without dictionaries: {e}");
			MemoryWordStore::new()
		}
	};
	info!("Loaded dictionaries: {:?}", store.dictionary_ids());

	let shared_data = SharedData {
		data_folder: folder,
		store: Arc::new(CachedWordStore::new(store)),
		board: CrosswordBoard::empty(),
		board_dictionary: None,
		generation: 0,
	};
	let shared_data = web::Data::new(Mutex::new(shared_data));

	info!("Listening on {bind}");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_dictionaries)
			.service(get_loaded_dictionaries)
			.service(put_dictionaries)
			.service(get_tokenized)
			.service(get_crossword)
			.service(put_submit)
			.service(put_concede)
			.service(get_hint)
	})
		.bind(bind)?
		.run()
		.await
}
