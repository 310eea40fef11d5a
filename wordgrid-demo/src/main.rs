use log::info;

use wordgrid_core::crossword::{CrosswordGenerator, GeneratorConfig};
use wordgrid_core::grapheme::split_graphemes;
use wordgrid_core::pick::draw_words_biased;
use wordgrid_core::store::cache::CachedWordStore;
use wordgrid_core::store::memory::MemoryWordStore;
use wordgrid_core::store::{CandidateFilter, WordStore};
use wordgrid_core::tokenizer::{texts, CancelFlag, Tokenizer};

#[actix_rt::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load all dictionaries from the "data" directory (.dat files)
    // The .bin cache next to each file is reused when it is up to date
    let store = CachedWordStore::new(MemoryWordStore::from_folder("./data")?);
    info!("Dictionaries: {:?}", store.inner().dictionary_ids());

    // Letters are grapheme clusters, not chars
    println!("{:?}", split_graphemes("ケーキ🇯🇵"));

    // Tokenize mixed-script text; the dictionary knows "ポケモン世界",
    // so the two segments are merged into one lookup candidate
    let tokenizer = Tokenizer::new();
    let sentence = "ようこそ！ポケモン世界へ";
    let segments = tokenizer.tokenize(sentence);
    println!("Plain:     {:?}", texts(&segments));
    let merged = tokenizer
        .tokenize_with_compounds(sentence, &store, "japanese", &CancelFlag::new())
        .await?;
    println!("Compounds: {:?}", texts(&merged));

    // A cancelled pass returns an error instead of partial output
    let cancel = CancelFlag::new();
    cancel.cancel();
    match tokenizer.tokenize_with_compounds(sentence, &store, "japanese", &cancel).await {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Cancelled pass: {e}"),
    }

    // Candidate words come back least practised first,
    // and the biased draw favours the front of the list
    let filter = CandidateFilter { min_graphemes: 3, ..CandidateFilter::default() };
    let mut pool = store.list_candidate_words("english", &filter).await?;
    let words = draw_words_biased(&mut pool, 12, &mut rand::rng());
    println!("Drawn words: {words:?}");

    // Build a board of at most 6 words
    let mut config = GeneratorConfig::default();
    config.set_max_words(6)?;
    let generator = CrosswordGenerator::new(config)?;
    let mut board = generator.generate(&words);

    println!("{}x{}, density {:.2}", board.width(), board.height(), board.density());
    println!("{}", board.render(false));

    // Hints are the first definition of each word, fetched on demand
    for index in 0..board.words().len() {
        let hint = board.request_hint(index, &store, "english").await?;
        println!("{:?} {}: {}", board.words()[index].orientation, index, hint);
    }

    // Give up on the first word, then show the solution
    if !board.words().is_empty() {
        board.concede(0)?;
    }
    println!("Solved: {}, conceded: {}", board.solved_count(), board.conceded_count());
    println!("{}", board.render(true));

    Ok(())
}
