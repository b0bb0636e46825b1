//! 直列化フォーマットの読み書き
//!
//! このモジュールは、レキシコンを行指向のTSV+JSONテキスト形式と
//! 相互変換するコーデックを提供します。各行はタブ区切りの5フィールド
//! （語形、見出し語、品詞、単純分割、JSON注釈）から成ります。
//!
//! フィールドの分割は単純なタブ分割です。この形式はフィールド内の
//! タブと改行を禁止しており、最終フィールドは生のJSONであるため、
//! CSV流の引用符処理を適用してはなりません。

use crate::errors::{Result, UsegError};
use crate::feature::{FeatureMap, FeatureValue};
use crate::span::Span;

/// 注釈層の名前を保持する予約キー
pub(crate) const KEY_ANNOT_NAME: &str = "annot_name";

/// 分割情報を保持する予約キー
pub(crate) const KEY_SEGMENTATION: &str = "segmentation";

/// 分割情報の各要素内でスパンを保持するキー
pub(crate) const KEY_SPAN: &str = "span";

/// 1行分のレコード
///
/// （語彙素・注釈層）の組ごとに1レコードが対応します。注釈層を
/// 持たない語彙素は、空の`simple_seg`を持つちょうど1レコードに
/// なります。
#[derive(Debug, Clone, PartialEq)]
pub struct SegRecord {
    /// 語形
    pub form: String,
    /// 見出し語
    pub lemma: String,
    /// 品詞タグ
    pub pos: String,
    /// 単純分割（語形に連結される断片の列、未分割なら空）
    pub simple_seg: Vec<String>,
    /// JSON注釈（語彙素の素性に加え、層があれば予約キー2つ）
    pub annot: FeatureMap,
}

/// 1行を解析してレコードを返します
///
/// 行はタブで5フィールドに分割されます（最終フィールドは残り全体）。
/// 第4フィールドは `" + "` で分割され、第5フィールドはJSONオブジェクト
/// として解析されます。
///
/// # 引数
///
/// * `line` - 解析する行（末尾の改行は無視されます）
///
/// # 戻り値
///
/// 解析されたレコード
///
/// # エラー
///
/// フィールド数が5でない場合、またはJSONが不正な場合、
/// [`UsegError::Schema`]が返されます。
pub fn parse_line(line: &str) -> Result<SegRecord> {
    let line = line.trim_end_matches('\n');
    let fields: Vec<&str> = line.splitn(5, '\t').collect();

    if fields.len() != 5 {
        return Err(UsegError::schema(format!("invalid line '{line}'")));
    }

    let simple_seg = if fields[3].is_empty() {
        vec![]
    } else {
        fields[3].split(" + ").map(str::to_string).collect()
    };

    let annot: FeatureMap = serde_json::from_str(fields[4]).map_err(|e| {
        UsegError::schema(format!("malformed annotation JSON in line '{line}': {e}"))
    })?;

    Ok(SegRecord {
        form: fields[0].to_string(),
        lemma: fields[1].to_string(),
        pos: fields[2].to_string(),
        simple_seg,
        annot,
    })
}

/// レコードをTSV形式の1行に直列化します
///
/// 注釈はキー昇順の単一行JSONとして書き出され、非ASCII文字は
/// エスケープされません。返される文字列には行末の改行が含まれます。
///
/// # 引数
///
/// * `record` - 直列化するレコード
///
/// # 戻り値
///
/// 改行付きの行文字列
///
/// # エラー
///
/// 空でない`simple_seg`の連結が語形と一致しない場合、
/// [`UsegError::Schema`]が返されます。
pub fn format_record(record: &SegRecord) -> Result<String> {
    if !record.simple_seg.is_empty() {
        let joined = record.simple_seg.concat();
        if joined != record.form {
            return Err(UsegError::schema(format!(
                "the segmentation {:?} doesn't match the word form '{}'",
                record.simple_seg, record.form
            )));
        }
    }

    let annot = serde_json::to_string(&record.annot)
        .map_err(|e| UsegError::schema(format!("unserializable annotation: {e}")))?;

    Ok(format!(
        "{}\t{}\t{}\t{}\t{}\n",
        record.form,
        record.lemma,
        record.pos,
        record.simple_seg.join(" + "),
        annot
    ))
}

/// スパンを素性値（整列済みオフセットのリスト）に変換します
pub(crate) fn span_to_value(span: &Span) -> FeatureValue {
    FeatureValue::List(
        span.iter()
            .map(|p| FeatureValue::Integer(p as i64))
            .collect(),
    )
}

/// 素性値からスパンを復元します
///
/// # エラー
///
/// 値が非負整数のリストでない場合、[`UsegError::Schema`]が返されます。
pub(crate) fn value_to_span(value: &FeatureValue) -> Result<Span> {
    let items = value
        .as_list()
        .ok_or_else(|| UsegError::schema("span is not a list"))?;

    let mut positions = Vec::with_capacity(items.len());
    for item in items {
        let offset = item
            .as_integer()
            .filter(|&v| v >= 0)
            .ok_or_else(|| UsegError::schema("span offsets must be nonnegative integers"))?;
        positions.push(offset as usize);
    }

    Ok(Span::new(positions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let record =
            parse_line("cats\tcat\tNOUN\tcat + s\t{\"annot_name\":\"L1\",\"segmentation\":[]}\n")
                .unwrap();
        assert_eq!("cats", record.form);
        assert_eq!("cat", record.lemma);
        assert_eq!("NOUN", record.pos);
        assert_eq!(vec!["cat".to_string(), "s".to_string()], record.simple_seg);
        assert!(record.annot.contains_key(KEY_ANNOT_NAME));
    }

    #[test]
    fn test_parse_line_unsegmented() {
        let record = parse_line("cats\tcat\tNOUN\t\t{}").unwrap();
        assert!(record.simple_seg.is_empty());
        assert!(record.annot.is_empty());
    }

    #[test]
    fn test_parse_line_wrong_field_count() {
        assert!(parse_line("cats\tcat\tNOUN\t").is_err());
        assert!(parse_line("").is_err());
    }

    #[test]
    fn test_parse_line_bad_json() {
        assert!(parse_line("cats\tcat\tNOUN\t\tnot json").is_err());
        assert!(parse_line("cats\tcat\tNOUN\t\t[1,2]").is_err());
        assert!(parse_line("cats\tcat\tNOUN\t\t{\"x\":1.5}").is_err());
    }

    #[test]
    fn test_format_record() {
        let record = SegRecord {
            form: "cats".to_string(),
            lemma: "cat".to_string(),
            pos: "NOUN".to_string(),
            simple_seg: vec!["cat".to_string(), "s".to_string()],
            annot: FeatureMap::new(),
        };
        assert_eq!("cats\tcat\tNOUN\tcat + s\t{}\n", format_record(&record).unwrap());
    }

    #[test]
    fn test_format_record_rejects_mismatched_pieces() {
        let record = SegRecord {
            form: "cats".to_string(),
            lemma: "cat".to_string(),
            pos: "NOUN".to_string(),
            simple_seg: vec!["dog".to_string(), "s".to_string()],
            annot: FeatureMap::new(),
        };
        assert!(format_record(&record).is_err());
    }

    #[test]
    fn test_span_value_round_trip() {
        let span = Span::new([3, 0, 1]);
        let value = span_to_value(&span);
        assert_eq!(span, value_to_span(&value).unwrap());

        assert!(value_to_span(&FeatureValue::from("x")).is_err());
        assert!(value_to_span(&FeatureValue::List(vec![FeatureValue::Integer(-1)])).is_err());
    }
}
