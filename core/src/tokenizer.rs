use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Turns raw text into the ordered token sequence that gets indexed and queried.
///
/// Implementations must be deterministic and side-effect free: the same text has
/// to produce the same tokens at index time and at query time.
pub trait Normalizer {
    fn normalize(&self, text: &str) -> Vec<String>;
}

impl<N: Normalizer + ?Sized> Normalizer for &N {
    fn normalize(&self, text: &str) -> Vec<String> { (**self).normalize(text) }
}

impl<N: Normalizer + ?Sized> Normalizer for Box<N> {
    fn normalize(&self, text: &str) -> Vec<String> { (**self).normalize(text) }
}

const STOPWORDS: &[&str] = &[
    "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
    "be","because","been","before","being","below","between","both","but","by",
    "can","can't","cannot","could","couldn't",
    "did","didn't","do","does","doesn't","doing","don","don't","down","during",
    "each","few","for","from","further",
    "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
    "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
    "just","let's","me","more","most","mustn't","my","myself",
    "no","nor","not","now","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
    "s","same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
    "t","than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
    "under","until","up","very",
    "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","will","with","won't","would","wouldn't",
    "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
];

/// English normalizer: NFKC, lowercase, word extraction, stop-word removal and
/// optional Snowball stemming. Punctuation and emoji never match the word pattern.
pub struct TextNormalizer {
    words: Regex,
    stopwords: HashSet<&'static str>,
    stemmer: Option<Stemmer>,
}

impl TextNormalizer {
    pub fn new() -> Self { Self::with_stemming(true) }

    pub fn with_stemming(stem: bool) -> Self {
        Self {
            words: Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex"),
            stopwords: STOPWORDS.iter().copied().collect(),
            stemmer: stem.then(|| Stemmer::create(Algorithm::English)),
        }
    }

    fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }
}

impl Default for TextNormalizer {
    fn default() -> Self { Self::new() }
}

impl Normalizer for TextNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for mat in self.words.find_iter(&normalized) {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            match &self.stemmer {
                Some(stemmer) => tokens.push(stemmer.stem(token).into_owned()),
                None => tokens.push(token.to_string()),
            }
        }
        tokens
    }
}
