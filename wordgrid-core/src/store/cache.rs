use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{CandidateFilter, Definitions, WordStore};
use crate::errors::Result;

type DefinitionMap = HashMap<String, HashMap<String, Definitions>>;

#[derive(Debug, Default)]
struct CacheState {
	definitions: DefinitionMap,
	/// Bumped by `invalidate` for one dictionary.
	versions: HashMap<String, u64>,
	/// Bumped by `invalidate_all`.
	epoch: u64,
}

/// Wraps a store and caches definitions per dictionary.
///
/// The cache is owned by whoever builds the store client; invalidate a
/// dictionary after editing it so hints pick up the new text. Every
/// invalidation bumps the dictionary's [`version`](Self::version), which
/// callers poll to know when derived data (segments, boards) is stale.
#[derive(Debug, Default)]
pub struct CachedWordStore<S> {
	inner: S,
	state: Mutex<CacheState>,
}

impl<S> CachedWordStore<S> {
	pub fn new(inner: S) -> Self {
		Self { inner, state: Mutex::new(CacheState::default()) }
	}

	pub fn inner(&self) -> &S {
		&self.inner
	}

	/// Cached definitions for `spelling`, if any.
	pub fn get(&self, dictionary_id: &str, spelling: &str) -> Option<Definitions> {
		self.lock()
			.definitions
			.get(dictionary_id)
			.and_then(|words| words.get(&spelling.to_lowercase()))
			.cloned()
	}

	/// Version signal of one dictionary. Starts at 0 and only grows.
	pub fn version(&self, dictionary_id: &str) -> u64 {
		let state = self.lock();
		state.epoch + state.versions.get(dictionary_id).copied().unwrap_or(0)
	}

	/// Drops every cached definition of one dictionary.
	pub fn invalidate(&self, dictionary_id: &str) {
		let mut state = self.lock();
		state.definitions.remove(dictionary_id);
		*state.versions.entry(dictionary_id.to_owned()).or_default() += 1;
	}

	pub fn invalidate_all(&self) {
		let mut state = self.lock();
		state.definitions.clear();
		state.epoch += 1;
	}

	fn lock(&self) -> MutexGuard<'_, CacheState> {
		// The state is always left consistent, a poisoned lock is still usable.
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

impl<S: WordStore> WordStore for CachedWordStore<S> {
	async fn list_words_starting_with(&self, dictionary_id: &str, prefix: &str) -> Result<Vec<String>> {
		self.inner.list_words_starting_with(dictionary_id, prefix).await
	}

	async fn list_candidate_words(&self, dictionary_id: &str, filter: &CandidateFilter) -> Result<Vec<String>> {
		self.inner.list_candidate_words(dictionary_id, filter).await
	}

	async fn get_definitions(&self, dictionary_id: &str, spelling: &str) -> Result<Definitions> {
		if let Some(cached) = self.get(dictionary_id, spelling) {
			return Ok(cached);
		}
		let definitions = self.inner.get_definitions(dictionary_id, spelling).await?;
		self.lock()
			.definitions
			.entry(dictionary_id.to_owned())
			.or_default()
			.insert(spelling.to_lowercase(), definitions.clone());
		Ok(definitions)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	/// Store counting definition fetches.
	#[derive(Default)]
	struct CountingStore {
		fetches: Cell<usize>,
	}

	impl WordStore for CountingStore {
		async fn list_words_starting_with(&self, _: &str, _: &str) -> Result<Vec<String>> {
			Ok(Vec::new())
		}

		async fn list_candidate_words(&self, _: &str, _: &CandidateFilter) -> Result<Vec<String>> {
			Ok(Vec::new())
		}

		async fn get_definitions(&self, _: &str, spelling: &str) -> Result<Definitions> {
			self.fetches.set(self.fetches.get() + 1);
			Ok(Definitions { definitions: vec![format!("meaning of {spelling}")] })
		}
	}

	#[actix_rt::test]
	async fn definitions_are_fetched_once() {
		let store = CachedWordStore::new(CountingStore::default());
		let first = store.get_definitions("en", "Cat").await.unwrap();
		let second = store.get_definitions("en", "cat").await.unwrap();
		assert_eq!(first, second);
		assert_eq!(store.inner().fetches.get(), 1);
		assert!(store.get("en", "CAT").is_some());
	}

	#[actix_rt::test]
	async fn invalidation_is_per_dictionary() {
		let store = CachedWordStore::new(CountingStore::default());
		store.get_definitions("en", "cat").await.unwrap();
		store.get_definitions("ja", "猫").await.unwrap();

		store.invalidate("en");
		assert!(store.get("en", "cat").is_none());
		assert!(store.get("ja", "猫").is_some());

		store.get_definitions("en", "cat").await.unwrap();
		assert_eq!(store.inner().fetches.get(), 3);

		store.invalidate_all();
		assert!(store.get("ja", "猫").is_none());
	}

	#[test]
	fn invalidation_bumps_the_version_signal() {
		let store = CachedWordStore::new(CountingStore::default());
		assert_eq!(store.version("en"), 0);
		assert_eq!(store.version("ja"), 0);

		store.invalidate("en");
		assert_eq!(store.version("en"), 1);
		assert_eq!(store.version("ja"), 0);

		store.invalidate_all();
		assert_eq!(store.version("en"), 2);
		assert_eq!(store.version("ja"), 1);
		assert_eq!(store.version("fr"), 1);
	}
}
