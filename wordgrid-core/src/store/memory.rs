use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::info;
use serde::{Deserialize, Serialize};

use super::{CandidateFilter, Definitions, WordStore};
use crate::errors::{Error, Result};
use crate::grapheme::grapheme_count;
use crate::io::{cache_path, data_folder, dictionary_id, is_fresh, list_dictionaries, read_lines, source_path};

/// One dictionary entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Entry {
	/// Spelling as written in the source file.
	pub spelling: String,
	pub definitions: Vec<String>,
	/// How well the learner knows the word, higher is better.
	pub confidence: f32,
}

/// A single dictionary keyed by lowercased spelling.
///
/// Source files are tab separated, one entry per line:
///
/// ```text
/// # comment
/// spelling<TAB>definition|other definition<TAB>confidence
/// ```
///
/// Definitions and confidence are optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
	entries: BTreeMap<String, Entry>,
}

impl Dictionary {
	/// Loads a dictionary from its `.dat` source file.
	///
	/// - Reads the `postcard` cache next to the source when it is up to date.
	/// - Otherwise parses the source in parallel and rewrites the cache.
	pub fn load<P: AsRef<Path>>(filepath: P) -> Result<Self> {
		let cache = cache_path(&filepath);
		if is_fresh(&cache, &filepath) {
			let bytes = std::fs::read(&cache)?;
			return Ok(postcard::from_bytes(&bytes)?);
		}
		Self::read_database_file(&filepath, cache)
	}

	/// Parses a source file in chunks on worker threads, merges the partial
	/// dictionaries and serializes the result.
	///
	/// # Notes
	/// - Chunk count is CPU cores * 8.
	/// - A malformed line aborts the load.
	fn read_database_file<PF, PC>(filename: PF, cache: PC) -> Result<Dictionary>
	where
		PF: AsRef<Path>,
		PC: AsRef<Path>,
	{
		let lines = read_lines(&filename)?;
		let chunks = num_cpus::get() * 8;
		let chunk_size = lines.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for (chunk_index, chunk) in lines.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();
			let first_line = chunk_index * chunk_size + 1;

			thread::spawn(move || {
				let mut partial = Dictionary::default();
				let mut result = Ok(());
				for (offset, line) in chunk.iter().enumerate() {
					result = partial.add_line(first_line + offset, line);
					if result.is_err() {
						break;
					}
				}
				// The receiver outlives every sender.
				let _ = tx.send((chunk_index, result.map(|_| partial)));
			});
		}
		drop(tx);

		// Merge in file order so duplicate spellings keep their definition order.
		let mut partials: Vec<(usize, Result<Dictionary>)> = rx.iter().collect();
		partials.sort_by_key(|(chunk_index, _)| *chunk_index);

		let mut dictionary = Dictionary::default();
		for (_, partial) in partials {
			dictionary.merge(&partial?);
		}

		let bytes = postcard::to_stdvec(&dictionary)?;
		std::fs::write(cache, bytes)?;

		info!("Parsed {} entries from {}", dictionary.len(), filename.as_ref().display());
		Ok(dictionary)
	}

	/// Parses one source line. Blank lines and `#` comments are skipped.
	fn add_line(&mut self, line_number: usize, line: &str) -> Result<()> {
		let line = line.trim_end_matches('\r');
		if line.trim().is_empty() || line.trim_start().starts_with('#') {
			return Ok(());
		}

		let mut fields = line.split('\t');
		let spelling = fields.next().unwrap_or("").trim();
		if spelling.is_empty() {
			return Err(Error::InvalidEntry { line: line_number, reason: "missing spelling".to_owned() });
		}

		let definitions: Vec<&str> = fields
			.next()
			.map(|d| d.split('|').map(str::trim).filter(|d| !d.is_empty()).collect())
			.unwrap_or_default();

		let confidence = match fields.next().map(str::trim).filter(|c| !c.is_empty()) {
			Some(c) => c.parse::<f32>().map_err(|e| Error::InvalidEntry {
				line: line_number,
				reason: format!("bad confidence '{c}': {e}"),
			})?,
			None => 0.0,
		};

		self.add_entry(spelling, &definitions, confidence);
		Ok(())
	}

	/// Adds an entry, merging with an existing one of the same spelling.
	pub fn add_entry(&mut self, spelling: &str, definitions: &[&str], confidence: f32) {
		let entry = Entry {
			spelling: spelling.to_owned(),
			definitions: definitions.iter().map(|d| (*d).to_owned()).collect(),
			confidence,
		};
		self.insert_entry(entry);
	}

	fn insert_entry(&mut self, entry: Entry) {
		let key = entry.spelling.to_lowercase();
		match self.entries.get_mut(&key) {
			Some(existing) => {
				for definition in entry.definitions {
					if !existing.definitions.contains(&definition) {
						existing.definitions.push(definition);
					}
				}
				existing.confidence = existing.confidence.max(entry.confidence);
			}
			None => {
				self.entries.insert(key, entry);
			}
		}
	}

	/// Merges another dictionary into this one.
	///
	/// Definitions are unioned and the higher confidence wins.
	pub fn merge(&mut self, other: &Self) {
		for entry in other.entries.values() {
			self.insert_entry(entry.clone());
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, spelling: &str) -> Option<&Entry> {
		self.entries.get(&spelling.to_lowercase())
	}

	/// Spellings starting with `prefix`, longest (in graphemes) first.
	pub fn starting_with(&self, prefix: &str) -> Vec<String> {
		let prefix = prefix.to_lowercase();
		let mut words: Vec<&Entry> = self
			.entries
			.range(prefix.clone()..)
			.take_while(|(key, _)| key.starts_with(&prefix))
			.map(|(_, entry)| entry)
			.collect();
		words.sort_by(|a, b| {
			grapheme_count(&b.spelling)
				.cmp(&grapheme_count(&a.spelling))
				.then_with(|| a.spelling.cmp(&b.spelling))
		});
		words.into_iter().map(|e| e.spelling.clone()).collect()
	}

	/// Spellings matching `filter`, lowest confidence first.
	pub fn candidates(&self, filter: &CandidateFilter) -> Vec<String> {
		let mut words: Vec<&Entry> = self
			.entries
			.values()
			.filter(|e| {
				let len = grapheme_count(&e.spelling);
				len >= filter.min_graphemes
					&& filter.max_graphemes.is_none_or(|max| len <= max)
					&& filter.max_confidence.is_none_or(|max| e.confidence <= max)
			})
			.collect();
		words.sort_by(|a, b| a.confidence.total_cmp(&b.confidence).then_with(|| a.spelling.cmp(&b.spelling)));
		let limit = filter.limit.unwrap_or(words.len());
		words.into_iter().take(limit).map(|e| e.spelling.clone()).collect()
	}
}

/// Word store holding every dictionary in memory.
#[derive(Debug, Default)]
pub struct MemoryWordStore {
	dictionaries: HashMap<String, Dictionary>,
}

impl MemoryWordStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads every `.dat` dictionary found directly in `folder`.
	///
	/// Both `"folder"` and `"folder/"` are accepted; subdirectories are
	/// ignored. Dictionary ids are the file names without extension.
	pub fn from_folder(folder: &str) -> Result<Self> {
		let folder = data_folder(folder);
		if !folder.is_dir() {
			return Err(Error::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Expected a directory, got: {}", folder.display()),
			)));
		}

		let mut store = Self::new();
		for id in list_dictionaries(&folder)? {
			store.load_dictionary(source_path(&folder, &id))?;
		}
		Ok(store)
	}

	/// Loads one dictionary file and returns its id.
	///
	/// # Errors
	/// Fails if a dictionary with the same id is already loaded.
	pub fn load_dictionary<P: AsRef<Path>>(&mut self, filepath: P) -> Result<String> {
		let id = dictionary_id(&filepath)?;
		if self.dictionaries.contains_key(&id) {
			return Err(Error::InvalidConfig(format!("Dictionary '{id}' already loaded")));
		}
		let dictionary = Dictionary::load(&filepath)?;
		info!("Loaded dictionary '{id}' ({} entries)", dictionary.len());
		self.dictionaries.insert(id.clone(), dictionary);
		Ok(id)
	}

	/// Adds or replaces a dictionary.
	pub fn insert(&mut self, dictionary_id: &str, dictionary: Dictionary) {
		self.dictionaries.insert(dictionary_id.to_owned(), dictionary);
	}

	/// Loaded dictionary ids, sorted.
	pub fn dictionary_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.dictionaries.keys().cloned().collect();
		ids.sort();
		ids
	}

	pub fn dictionary(&self, dictionary_id: &str) -> Result<&Dictionary> {
		self.dictionaries
			.get(dictionary_id)
			.ok_or_else(|| Error::UnknownDictionary(dictionary_id.to_owned()))
	}
}

impl WordStore for MemoryWordStore {
	async fn list_words_starting_with(&self, dictionary_id: &str, prefix: &str) -> Result<Vec<String>> {
		Ok(self.dictionary(dictionary_id)?.starting_with(prefix))
	}

	async fn list_candidate_words(&self, dictionary_id: &str, filter: &CandidateFilter) -> Result<Vec<String>> {
		Ok(self.dictionary(dictionary_id)?.candidates(filter))
	}

	async fn get_definitions(&self, dictionary_id: &str, spelling: &str) -> Result<Definitions> {
		let definitions = self
			.dictionary(dictionary_id)?
			.get(spelling)
			.map(|e| e.definitions.clone())
			.unwrap_or_default();
		Ok(Definitions { definitions })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	const SOURCE: &str = "# test dictionary\n\
		cat\tsmall feline|pet\t0.9\n\
		car\tvehicle\t0.2\n\
		\n\
		cart\tsmall wagon\n\
		Catalog\tlist of items\t0.5\n\
		cat\tmouser\t0.1\n";

	fn sample() -> Dictionary {
		let mut dictionary = Dictionary::default();
		for (i, line) in SOURCE.lines().enumerate() {
			dictionary.add_line(i + 1, line).unwrap();
		}
		dictionary
	}

	#[test]
	fn parses_lines_and_merges_duplicates() {
		let dictionary = sample();
		assert_eq!(dictionary.len(), 4);
		let cat = dictionary.get("CAT").unwrap();
		assert_eq!(cat.definitions, vec!["small feline", "pet", "mouser"]);
		assert_eq!(cat.confidence, 0.9);
		assert_eq!(dictionary.get("cart").unwrap().confidence, 0.0);
	}

	#[test]
	fn rejects_bad_lines() {
		let mut dictionary = Dictionary::default();
		assert!(matches!(dictionary.add_line(3, "\tno spelling"), Err(Error::InvalidEntry { line: 3, .. })));
		assert!(matches!(dictionary.add_line(4, "word\tdef\tmuch"), Err(Error::InvalidEntry { line: 4, .. })));
	}

	#[test]
	fn prefix_search_is_longest_first() {
		let dictionary = sample();
		assert_eq!(dictionary.starting_with("ca"), vec!["Catalog", "cart", "car", "cat"]);
		assert_eq!(dictionary.starting_with("CAT"), vec!["Catalog", "cat"]);
		assert!(dictionary.starting_with("dog").is_empty());
	}

	#[test]
	fn candidates_are_filtered_and_least_confident_first() {
		let dictionary = sample();
		let all = dictionary.candidates(&CandidateFilter::default());
		assert_eq!(all, vec!["cart", "car", "Catalog", "cat"]);

		let filter = CandidateFilter {
			min_graphemes: 4,
			max_graphemes: Some(5),
			max_confidence: Some(0.5),
			limit: None,
		};
		assert_eq!(dictionary.candidates(&filter), vec!["cart"]);

		let limited = CandidateFilter { limit: Some(2), ..CandidateFilter::default() };
		assert_eq!(dictionary.candidates(&limited), vec!["cart", "car"]);
	}

	#[test]
	fn load_writes_and_reuses_cache() {
		let dir = tempfile::tempdir().unwrap();
		let source = dir.path().join("english.dat");
		fs::write(&source, SOURCE).unwrap();

		let parsed = Dictionary::load(&source).unwrap();
		assert!(dir.path().join("english.bin").exists());
		let cached = Dictionary::load(&source).unwrap();
		assert_eq!(parsed, cached);
		assert_eq!(parsed, sample());
	}

	#[test]
	fn folder_load_uses_file_stems_as_ids() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("english.dat"), SOURCE).unwrap();
		fs::write(dir.path().join("japanese.dat"), "世界\tworld\n").unwrap();

		let mut store = MemoryWordStore::from_folder(dir.path().to_str().unwrap()).unwrap();
		assert_eq!(store.dictionary_ids(), vec!["english", "japanese"]);
		assert!(store.load_dictionary(dir.path().join("english.dat")).is_err());
	}

	#[actix_rt::test]
	async fn store_reports_unknown_dictionaries() {
		let mut store = MemoryWordStore::new();
		store.insert("english", sample());

		let definitions = store.get_definitions("english", "car").await.unwrap();
		assert_eq!(definitions.definitions, vec!["vehicle"]);
		let missing = store.get_definitions("english", "zebra").await.unwrap();
		assert!(missing.definitions.is_empty());
		assert!(matches!(
			store.list_words_starting_with("french", "ca").await,
			Err(Error::UnknownDictionary(_))
		));
	}
}
