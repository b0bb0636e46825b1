//! # Useg
//!
//! Usegは、形態素分割資源を正準表現へ正規化するための共有エンジンです。
//!
//! ## 概要
//!
//! このライブラリは、独立に作られた多数の分割辞書を1つの正準表現へ
//! 変換する際に、資源固有の変換器すべてが依存する共通基盤を提供します。
//! 中核となるのは以下の3つのコンポーネントです:
//!
//! - **整列エンジン**: 理想化されたモルフ文字列の列を、正確に連結
//!   しない場合でも語形の文字列上へ写像し、最小コストの境界分割を
//!   返す純粋関数
//! - **分割レキシコン**: 語彙素ごとに複数の独立した分割を（不連続で
//!   ありうる）文字スパンの集合と開いた素性注釈として保持し、絞り
//!   込み検索と挿入時の不変条件検査を提供するインメモリ格納庫
//! - **コーデック**: レキシコンと行指向のTSV+JSONテキスト形式との
//!   損失のない双方向変換
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> useg::errors::Result<()> {
//! use useg::{infer_bounds, FeatureMap, FeatureValue, Lexicon};
//!
//! // モルフの連結が語形と一致すれば、コスト0で正確な境界が得られます。
//! let (bounds, cost) = infer_bounds(&["pes", "vod"], "pesvod")?;
//! assert_eq!(bounds, vec![0, 3, 6]);
//! assert_eq!(cost, 0.0);
//!
//! // レキシコンに語彙素と分割を登録し、TSV+JSON形式で書き出します。
//! let mut lexicon = Lexicon::new();
//! let id = lexicon.add_lexeme("cats", "cat", "NOUN", FeatureMap::new());
//!
//! let mut root = FeatureMap::new();
//! root.insert("type".to_string(), FeatureValue::from("root"));
//! lexicon.add_contiguous_morpheme(id, "L1", 0, 3, root)?;
//!
//! let mut suffix = FeatureMap::new();
//! suffix.insert("type".to_string(), FeatureValue::from("suffix"));
//! lexicon.add_contiguous_morpheme(id, "L1", 3, 4, suffix)?;
//!
//! let mut out = vec![];
//! lexicon.save(&mut out)?;
//! assert_eq!(
//!     "cats\tcat\tNOUN\tcat + s\t{\"annot_name\":\"L1\",\"segmentation\":\
//!      [{\"span\":[0,1,2],\"type\":\"root\"},{\"span\":[3],\"type\":\"suffix\"}]}\n",
//!     std::str::from_utf8(&out).unwrap(),
//! );
//! # Ok(())
//! # }
//! ```

/// モルフ列と語形の整列エンジン
pub mod alignment;

/// 共通の定数
pub mod common;

/// エラー型の定義
pub mod errors;

/// 開放的な素性注釈の表現
pub mod feature;

/// 分割レキシコンの格納と検索
pub mod lexicon;

/// 直列化フォーマットの読み書き
pub mod record;

/// モルフィームスパンの表現
pub mod span;


// Re-exports
pub use alignment::infer_bounds;
pub use feature::{FeatureMap, FeatureValue};
pub use lexicon::{Lexeme, LexemeId, Lexicon, Morpheme};
pub use record::SegRecord;
pub use span::Span;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
