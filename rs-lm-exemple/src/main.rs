use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_lm_core::model::generator::generate;
use rs_lm_core::model::language_model::LanguageModel;
use rs_lm_core::model::perplexity::perplexity;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A tiny in-memory corpus; the corpus-acquisition layer would normally
    // provide these documents (scraped articles, recipes, lyrics...)
    let corpus = [
        "The wheel has come full circle.",
        "The wheel of fortune turns faster than a mill wheel.",
        "This is the remix.",
        "The remix has come full circle.",
    ];

    // Train an order-3 model: every history of 3 characters maps to the
    // distribution of characters observed after it
    let model = LanguageModel::train(&corpus, 3)?;
    println!("Trained {} histories", model.len());

    // Inspect one distribution, as you would poke at lm["he "]
    if let Some(distribution) = model.distribution("he ") {
        println!("'he ' observed {} times", distribution.total());
        for (next_char, probability) in distribution.probabilities() {
            println!("'he ' -> {:?}: {:.3}", next_char, probability);
        }
    }

    // Training with order 0 is rejected
    match LanguageModel::train(&corpus, 0) {
        Ok(_) => println!("Should not happen"),
        Err(error) => println!("Order 0 is invalid: {}", error),
    }

    // Generation takes an injected random source: a seeded generator makes
    // the output reproducible, run after run
    let mut rng = StdRng::seed_from_u64(42);
    for i in 0..5 {
        match generate(&model, 40, &mut rng) {
            Ok(sequence) => println!("Generated sequence {}: {}", i + 1, sequence),
            // The model may under-cover the history space; an unusual path
            // ends with an explicit error instead of a silent miss
            Err(error) => println!("Generation {} stopped: {}", i + 1, error),
        }
    }

    // Score the training corpus against itself (low perplexity)...
    println!("Self perplexity: {}", perplexity(&model, &corpus)?);

    // ...and a held-out document (higher perplexity)
    let held_out = ["The mill of fortune is a remix."];
    println!("Held-out perplexity: {}", perplexity(&model, &held_out)?);

    // An empty test corpus is rejected
    let empty: Vec<&str> = Vec::new();
    match perplexity(&model, &empty) {
        Ok(_) => println!("Should not happen"),
        Err(error) => println!("Empty corpus is invalid: {}", error),
    }

    // Corpus files work too: one document per line, with a binary cache
    // written next to the file for fast reloading on later runs
    let corpus_path = std::env::temp_dir().join("rs-lm-exemple-corpus.txt");
    std::fs::write(&corpus_path, corpus.join("\n"))?;
    let reloaded = LanguageModel::from_corpus_file(&corpus_path, 3)?;
    println!("Corpus file model has {} histories", reloaded.len());

    Ok(())
}
