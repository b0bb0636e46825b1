//! 直列化の往復に関するテスト
//!
//! 保存→読み込み→保存がバイト単位で同一の出力を生むこと、および
//! ファイル経由の保存と読み込みが一致することを検証します。

use tempfile::tempdir;

use crate::feature::{FeatureMap, FeatureValue};
use crate::lexicon::Lexicon;
use crate::span::Span;

fn features(pairs: &[(&str, &str)]) -> FeatureMap {
    pairs
        .iter()
        .map(|&(k, v)| (k.to_string(), FeatureValue::from(v)))
        .collect()
}

/// 複数の語彙素、層、不連続スパン、非ASCII文字を含むレキシコンを
/// 構築します。
fn populated_lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new();

    let pesvod = lexicon.add_lexeme("pesvod", "pesvod", "NOUN", features(&[("lang", "ces")]));
    lexicon
        .add_contiguous_morpheme(pesvod, "seg", 0, 3, features(&[("morpheme", "pes"), ("type", "root")]))
        .unwrap();
    lexicon
        .add_contiguous_morpheme(pesvod, "seg", 3, 6, features(&[("morpheme", "vodit"), ("type", "root")]))
        .unwrap();

    let cern = lexicon.add_lexeme("čerň", "čerň", "NOUN", FeatureMap::new());
    lexicon
        .add_morphemes_from_list(cern, "seg", &["čer", "ň"])
        .unwrap();

    let gebaut = lexicon.add_lexeme("gebaut", "bauen", "VERB", FeatureMap::new());
    lexicon
        .add_morpheme(gebaut, "seg", Span::new([0, 1, 5]), features(&[("type", "circumfix")]))
        .unwrap();
    lexicon
        .add_contiguous_morpheme(gebaut, "seg", 2, 5, features(&[("type", "stem")]))
        .unwrap();

    // An unsegmented lexeme and a second layer on an existing one.
    lexicon.add_lexeme("unsegmented", "unsegmented", "X", FeatureMap::new());
    lexicon
        .add_morphemes_from_list(pesvod, "coarse", &["pesvod"])
        .unwrap();

    lexicon
}

fn save_to_string(lexicon: &Lexicon) -> String {
    let mut out = vec![];
    lexicon.save(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_save_load_save_is_byte_identical() {
    let lexicon = populated_lexicon();
    let first = save_to_string(&lexicon);

    let mut reloaded = Lexicon::new();
    reloaded.load(first.as_bytes()).unwrap();
    let second = save_to_string(&reloaded);

    assert_eq!(first, second);

    // A third generation stays stable as well.
    let mut reloaded_again = Lexicon::new();
    reloaded_again.load(second.as_bytes()).unwrap();
    assert_eq!(second, save_to_string(&reloaded_again));
}

#[test]
fn test_load_preserves_contents() {
    let lexicon = populated_lexicon();
    let saved = save_to_string(&lexicon);

    let mut reloaded = Lexicon::new();
    reloaded.load(saved.as_bytes()).unwrap();

    // Loading materializes one lexeme per row, so a lexeme with two
    // layers comes back as two single-layer lexemes.
    assert_eq!(saved.lines().count(), reloaded.len());

    let cern = reloaded
        .iter_lexemes(Some("čerň"), None, None)
        .next()
        .unwrap();
    assert_eq!(vec!["čer", "ň"], reloaded.simple_segmentation(cern, "seg"));

    let gebaut = reloaded
        .iter_lexemes(None, Some("bauen"), Some("VERB"))
        .next()
        .unwrap();
    let circumfix = reloaded.morpheme(gebaut, "seg", 0).unwrap().unwrap();
    assert_eq!(&[0, 1, 5], circumfix.span().positions());

    let mut pesvod_layers: Vec<String> = reloaded
        .iter_lexemes(Some("pesvod"), None, None)
        .flat_map(|id| {
            reloaded
                .lexeme(id)
                .annotation_names()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    pesvod_layers.sort();
    assert_eq!(vec!["coarse", "seg"], pesvod_layers);
}

#[test]
fn test_round_trip_through_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lexicon.tsv");

    let lexicon = populated_lexicon();
    lexicon.save_to_path(&path).unwrap();

    let mut reloaded = Lexicon::new();
    reloaded.load_from_path(&path).unwrap();

    assert_eq!(save_to_string(&lexicon), save_to_string(&reloaded));
}
