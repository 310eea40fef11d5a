use std::path::{Path, PathBuf};
use std::{fs, io};

/// Extension of dictionary source files.
pub const SOURCE_EXTENSION: &str = "dat";

/// Extension of the binary cache written next to each source.
pub const CACHE_EXTENSION: &str = "bin";

/// Reads a dictionary source and returns its lines without their
/// `\n` or `\r\n` endings.
pub(crate) fn read_lines<P: AsRef<Path>>(source: P) -> io::Result<Vec<String>> {
	Ok(fs::read_to_string(source)?.lines().map(str::to_owned).collect())
}

/// Path of the binary cache belonging to `source`.
///
/// Example: `data/english.dat` → `data/english.bin`
pub(crate) fn cache_path<P: AsRef<Path>>(source: P) -> PathBuf {
	source.as_ref().with_extension(CACHE_EXTENSION)
}

/// Dictionary id of a source file: its file name without extension.
///
/// Examples:
/// - `"./data/english.dat"` → `"english"`
/// - `"english.dat"` → `"english"`
pub(crate) fn dictionary_id<P: AsRef<Path>>(source: P) -> io::Result<String> {
	source
		.as_ref()
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Dictionary path has no file name"))
}

/// Whether `cache` exists and is at least as recent as `source`.
pub(crate) fn is_fresh<P: AsRef<Path>, Q: AsRef<Path>>(cache: P, source: Q) -> bool {
	let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
	match (modified(cache.as_ref()), modified(source.as_ref())) {
		(Some(cache), Some(source)) => cache >= source,
		_ => false,
	}
}

/// Turns a user-supplied data folder into a path.
///
/// `""`, `"."` and `"./"` mean the current directory; a trailing separator
/// is ignored otherwise.
pub fn data_folder(input: &str) -> PathBuf {
	let trimmed = input.trim_end_matches(['/', '\\']);
	if trimmed.is_empty() || trimmed == "." {
		PathBuf::from(".")
	} else {
		PathBuf::from(trimmed)
	}
}

/// Ids of the dictionaries found directly in `dir`, sorted.
///
/// Subdirectories and files with other extensions are ignored.
pub fn list_dictionaries<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut ids = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		let is_source = path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION);
		if is_source && path.is_file() {
			ids.push(dictionary_id(&path)?);
		}
	}
	ids.sort();
	Ok(ids)
}

/// Source path of dictionary `id` inside `dir`.
pub fn source_path<P: AsRef<Path>>(dir: P, id: &str) -> PathBuf {
	dir.as_ref().join(format!("{id}.{SOURCE_EXTENSION}"))
}
