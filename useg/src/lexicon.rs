//! 分割レキシコンの格納と検索
//!
//! このモジュールは、語彙素ごとに0個以上の名前付き注釈層を保持する
//! インメモリの格納庫[`Lexicon`]を提供します。各注釈層は同じ語形に
//! 対する独立した分割で、モルフィームのスパンと素性の列から成ります。
//! 品詞・見出し語・語形による絞り込み検索のための二次索引を維持し、
//! 挿入時にスパンの範囲不変条件を検査します。
//!
//! 格納庫は内部ロックを持たない同期的な可変オブジェクトです。複数
//! スレッドからの並行変更はサポートされず、並列変換はワーカーごとに
//! 1インスタンスを使い、直列化された出力を後で統合してください。

mod lexeme;
mod morpheme;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use hashbrown::HashMap;

use crate::errors::{Result, UsegError};
use crate::feature::{FeatureMap, FeatureValue};
use crate::record::{
    self, SegRecord, KEY_ANNOT_NAME, KEY_SEGMENTATION, KEY_SPAN,
};
use crate::span::Span;

pub use lexeme::{Lexeme, LexemeId};
pub use morpheme::Morpheme;

/// 分割のレキシコン
///
/// 語彙素は識別子で参照されます。各語彙素は語形を持ち、語形は
/// モルフィームへ細分化できます。複数の代替的な細分化が可能で、
/// それぞれ注釈層の名前で識別されます。
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    lexemes: Vec<Lexeme>,
    by_pos: BTreeMap<String, BTreeMap<String, Vec<LexemeId>>>,
    by_form: HashMap<String, Vec<LexemeId>>,
}

impl Lexicon {
    /// 新しい空のレキシコンを生成します
    pub fn new() -> Self {
        Self::default()
    }

    /// 格納されている語彙素の数を返します
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.lexemes.len()
    }

    /// レキシコンが空かどうかを判定します
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }

    /// 新しい語彙素を追加し、その識別子を返します
    ///
    /// この操作は常に成功します。同一の（語形・見出し語・品詞）を
    /// 持つ語彙素を複数追加できます。
    ///
    /// # 引数
    ///
    /// * `form` - 語形
    /// * `lemma` - 見出し語
    /// * `pos` - 品詞タグ（開いた語彙、例: NOUN/VERB/ADJ/PROPN/X）
    /// * `features` - 素性注釈（なければ空のマップ）
    ///
    /// # 戻り値
    ///
    /// 追加された語彙素の識別子
    pub fn add_lexeme<F, L, P>(
        &mut self,
        form: F,
        lemma: L,
        pos: P,
        features: FeatureMap,
    ) -> LexemeId
    where
        F: Into<String>,
        L: Into<String>,
        P: Into<String>,
    {
        let form = form.into();
        let lemma = lemma.into();
        let pos = pos.into();

        let lex_id = LexemeId(self.lexemes.len());

        self.by_pos
            .entry(pos.clone())
            .or_default()
            .entry(lemma.clone())
            .or_default()
            .push(lex_id);
        self.by_form.entry(form.clone()).or_default().push(lex_id);

        self.lexemes.push(Lexeme::new(form, lemma, pos, features));
        lex_id
    }

    /// 指定された属性を持つ語彙素を検索します
    ///
    /// `None`のフィルタはワイルドカードとして扱われます。すべての
    /// フィルタが`None`の場合は挿入順で全語彙素を返します。絞り込み
    /// 検索の結果順は決定的ですが規定されません。
    ///
    /// # 引数
    ///
    /// * `form` - 語形によるフィルタ
    /// * `lemma` - 見出し語によるフィルタ
    /// * `pos` - 品詞によるフィルタ
    ///
    /// # 戻り値
    ///
    /// 一致する語彙素の識別子のイテレータ
    pub fn iter_lexemes(
        &self,
        form: Option<&str>,
        lemma: Option<&str>,
        pos: Option<&str>,
    ) -> impl Iterator<Item = LexemeId> {
        let ids: Vec<LexemeId> = if let Some(form) = form {
            // Probe the form index and post-filter.
            match self.by_form.get(form) {
                Some(ids) => ids
                    .iter()
                    .copied()
                    .filter(|&id| lemma.map_or(true, |l| self.lemma(id) == l))
                    .filter(|&id| pos.map_or(true, |p| self.pos(id) == p))
                    .collect(),
                None => vec![],
            }
        } else if lemma.is_none() && pos.is_none() {
            (0..self.lexemes.len()).map(LexemeId).collect()
        } else {
            let subtrees: Vec<&BTreeMap<String, Vec<LexemeId>>> = match pos {
                Some(p) => self.by_pos.get(p).into_iter().collect(),
                None => self.by_pos.values().collect(),
            };

            let mut ids = vec![];
            for lemmas in subtrees {
                match lemma {
                    Some(l) => {
                        if let Some(v) = lemmas.get(l) {
                            ids.extend_from_slice(v);
                        }
                    }
                    None => {
                        for v in lemmas.values() {
                            ids.extend_from_slice(v);
                        }
                    }
                }
            }
            ids
        };

        ids.into_iter()
    }

    /// 語彙素への参照を返します
    ///
    /// # 引数
    ///
    /// * `lex_id` - このレキシコンが発行した識別子
    ///
    /// # パニック
    ///
    /// 識別子がこのレキシコンで発行されたものでない場合はパニック
    /// する可能性があります。
    #[inline(always)]
    pub fn lexeme(&self, lex_id: LexemeId) -> &Lexeme {
        &self.lexemes[lex_id.index()]
    }

    /// 語彙素の語形を返します
    #[inline(always)]
    pub fn form(&self, lex_id: LexemeId) -> &str {
        self.lexemes[lex_id.index()].form()
    }

    /// 語彙素の見出し語を返します
    #[inline(always)]
    pub fn lemma(&self, lex_id: LexemeId) -> &str {
        self.lexemes[lex_id.index()].lemma()
    }

    /// 語彙素の品詞タグを返します
    #[inline(always)]
    pub fn pos(&self, lex_id: LexemeId) -> &str {
        self.lexemes[lex_id.index()].pos()
    }

    /// 語彙素の素性マップへの参照を返します
    #[inline(always)]
    pub fn features(&self, lex_id: LexemeId) -> &FeatureMap {
        self.lexemes[lex_id.index()].features()
    }

    /// 語彙素の素性マップへの可変参照を返します
    ///
    /// 語彙素の素性は生成後に自由に編集できます。
    #[inline(always)]
    pub fn features_mut(&mut self, lex_id: LexemeId) -> &mut FeatureMap {
        &mut self.lexemes[lex_id.index()].features
    }

    /// 語彙素の表示用文字列を返します
    ///
    /// ログやエラーメッセージでの表示を意図した `語形(見出し語#品詞)`
    /// 形式です。直列化には[`save`](Self::save)を使ってください。
    pub fn print_lexeme(&self, lex_id: LexemeId) -> String {
        let lexeme = &self.lexemes[lex_id.index()];
        format!("{}({}#{})", lexeme.form(), lexeme.lemma(), lexeme.pos())
    }

    /// 連続する区間 `[start, end)` のモルフィームを追加します
    ///
    /// # 引数
    ///
    /// * `lex_id` - 対象の語彙素
    /// * `annot_name` - 注釈層の名前
    /// * `start` - 開始位置（含む）
    /// * `end` - 終了位置（含まない）
    /// * `features` - モルフィームの素性
    ///
    /// # エラー
    ///
    /// 区間が語形の範囲外を指す場合、[`UsegError::Bounds`]が返されます。
    pub fn add_contiguous_morpheme(
        &mut self,
        lex_id: LexemeId,
        annot_name: &str,
        start: usize,
        end: usize,
        features: FeatureMap,
    ) -> Result<()> {
        self.add_morpheme(lex_id, annot_name, Span::from_range(start, end), features)
    }

    /// モルフィームを追加します
    ///
    /// 同一層内での重複や重なりは許されます。変換器は1つの分割に
    /// 確定する前に候補の分割を記録できます。
    ///
    /// # 引数
    ///
    /// * `lex_id` - 対象の語彙素
    /// * `annot_name` - 注釈層の名前
    /// * `span` - 占有する文字位置の集合（連続でなくてもよい）
    /// * `features` - モルフィームの素性
    ///
    /// # エラー
    ///
    /// スパンのいずれかの位置が `[0, 語形の文字数)` の外にある場合、
    /// [`UsegError::Bounds`]が返されます。位置が丸められることは
    /// ありません。
    pub fn add_morpheme(
        &mut self,
        lex_id: LexemeId,
        annot_name: &str,
        span: Span,
        features: FeatureMap,
    ) -> Result<()> {
        let len_char = self.lexemes[lex_id.index()].len_char();
        for position in &span {
            if position >= len_char {
                return Err(UsegError::bounds(position, self.print_lexeme(lex_id)));
            }
        }

        self.lexemes[lex_id.index()]
            .annotations
            .entry(annot_name.to_string())
            .or_default()
            .push(Morpheme::new(span, features));
        Ok(())
    }

    /// モルフ文字列の列からモルフィームを追加します
    ///
    /// 語形を左から右へ消費し、各モルフを期待される位置の正確な
    /// 接頭辞として照合します。いずれかのモルフが一致しない場合、
    /// 何も追加せずに失敗します。
    ///
    /// # 引数
    ///
    /// * `lex_id` - 対象の語彙素
    /// * `annot_name` - 注釈層の名前
    /// * `morphs` - モルフ文字列の列
    ///
    /// # エラー
    ///
    /// いずれかのモルフが語形の対応する断片と一致しない場合、
    /// [`UsegError::Mismatch`]が返され、モルフィームは一切追加
    /// されません。
    pub fn add_morphemes_from_list<S>(
        &mut self,
        lex_id: LexemeId,
        annot_name: &str,
        morphs: &[S],
    ) -> Result<()>
    where
        S: AsRef<str>,
    {
        let mut to_add = vec![];
        {
            let lexeme = &self.lexemes[lex_id.index()];
            let chars = lexeme.chars();
            let mut end = 0;
            for morph in morphs {
                let start = end;
                let morph_chars: Vec<char> = morph.as_ref().chars().collect();
                let fits = start + morph_chars.len() <= chars.len()
                    && chars[start..start + morph_chars.len()] == morph_chars[..];
                if !fits {
                    return Err(UsegError::mismatch(morph.as_ref(), lexeme.form(), start));
                }
                end = start + morph_chars.len();
                to_add.push((start, end));
            }
        }

        for (start, end) in to_add {
            self.add_contiguous_morpheme(lex_id, annot_name, start, end, FeatureMap::new())?;
        }
        Ok(())
    }

    /// 注釈層上のモルフィームを列挙します
    ///
    /// # 引数
    ///
    /// * `lex_id` - 対象の語彙素
    /// * `annot_name` - 注釈層の名前
    /// * `sort` - `true`の場合、スパン順に整列して返します
    /// * `position` - 指定された場合、その位置を覆うものだけを返します
    ///
    /// # 戻り値
    ///
    /// 一致するモルフィームへの参照のベクター。層が存在しない場合や
    /// 位置を覆うものがない場合は空のベクターを返します。
    ///
    /// # エラー
    ///
    /// `position` が語形の範囲外の場合、[`UsegError::Bounds`]が
    /// 返されます。
    pub fn morphemes(
        &self,
        lex_id: LexemeId,
        annot_name: &str,
        sort: bool,
        position: Option<usize>,
    ) -> Result<Vec<&Morpheme>> {
        let lexeme = &self.lexemes[lex_id.index()];
        let Some(list) = lexeme.annotations.get(annot_name) else {
            return Ok(vec![]);
        };

        let mut selected: Vec<&Morpheme> = match position {
            None => list.iter().collect(),
            Some(p) => {
                if p >= lexeme.len_char() {
                    return Err(UsegError::bounds(p, self.print_lexeme(lex_id)));
                }
                list.iter().filter(|m| m.span().contains(p)).collect()
            }
        };

        if sort {
            selected.sort_by(|a, b| a.span().cmp(b.span()));
        }
        Ok(selected)
    }

    /// 指定位置を覆うモルフィームを1つ返します
    ///
    /// 複数のモルフィームがその位置を覆う場合は、最初に挿入された
    /// ものを返します。呼び出し側は「どれか1つ」以上を仮定しては
    /// なりません。覆うものがなければ`None`を返します。
    ///
    /// # 引数
    ///
    /// * `lex_id` - 対象の語彙素
    /// * `annot_name` - 注釈層の名前
    /// * `position` - 文字位置
    ///
    /// # エラー
    ///
    /// `position` が語形の範囲外の場合、[`UsegError::Bounds`]が
    /// 返されます。
    pub fn morpheme(
        &self,
        lex_id: LexemeId,
        annot_name: &str,
        position: usize,
    ) -> Result<Option<&Morpheme>> {
        let lexeme = &self.lexemes[lex_id.index()];
        if position >= lexeme.len_char() {
            return Err(UsegError::bounds(position, self.print_lexeme(lex_id)));
        }

        Ok(lexeme
            .annotations
            .get(annot_name)
            .and_then(|list| list.iter().find(|m| m.span().contains(position))))
    }

    /// 指定位置を覆うモルフィームの文字列形を返します
    ///
    /// 不連続なスパンの断片は `" + "` で連結されます。空のスパンは
    /// 空文字列になります。覆うモルフィームがなければ`None`を
    /// 返します。
    ///
    /// # 引数
    ///
    /// * `lex_id` - 対象の語彙素
    /// * `annot_name` - 注釈層の名前
    /// * `position` - 文字位置
    ///
    /// # エラー
    ///
    /// `position` が語形の範囲外の場合、[`UsegError::Bounds`]が
    /// 返されます。
    pub fn morph(
        &self,
        lex_id: LexemeId,
        annot_name: &str,
        position: usize,
    ) -> Result<Option<String>> {
        let Some(morpheme) = self.morpheme(lex_id, annot_name, position)? else {
            return Ok(None);
        };

        let chars = self.lexemes[lex_id.index()].chars();
        let mut morph = String::new();
        let mut last: Option<usize> = None;
        for p in morpheme.span() {
            if let Some(l) = last {
                if p != l + 1 {
                    morph.push_str(" + ");
                }
            }
            morph.push(chars[p]);
            last = Some(p);
        }
        Ok(Some(morph))
    }

    /// 注釈層の単純分割を返します
    ///
    /// 語形を左から右へ走査し、各位置についてスパン順で最初の覆う
    /// モルフィームを選びます。選ばれたモルフィームが変わる位置で
    /// 断片が区切られるため、断片の連結は常に語形と一致します。
    /// 覆われていない位置はそれ自体で断片にまとめられます。
    ///
    /// # 引数
    ///
    /// * `lex_id` - 対象の語彙素
    /// * `annot_name` - 注釈層の名前
    ///
    /// # 戻り値
    ///
    /// 断片の列。層が存在しない場合は語形全体の1断片（語形が空なら
    /// 空のベクター）を返します。
    pub fn simple_segmentation(&self, lex_id: LexemeId, annot_name: &str) -> Vec<String> {
        Self::simple_seg_of(&self.lexemes[lex_id.index()], annot_name)
    }

    fn simple_seg_of(lexeme: &Lexeme, annot_name: &str) -> Vec<String> {
        if lexeme.chars().is_empty() {
            return vec![];
        }

        let morphemes = lexeme.annotations.get(annot_name);
        let mut order: Vec<usize> = match morphemes {
            Some(list) => (0..list.len()).collect(),
            None => vec![],
        };
        if let Some(list) = morphemes {
            order.sort_by(|&a, &b| list[a].span().cmp(list[b].span()));
        }

        let pick = |position: usize| -> Option<usize> {
            let list = morphemes?;
            order
                .iter()
                .copied()
                .find(|&idx| list[idx].span().contains(position))
        };

        let mut pieces = vec![];
        let mut current = String::new();
        let mut last = pick(0);
        for (i, &c) in lexeme.chars().iter().enumerate() {
            let covering = pick(i);
            if covering == last {
                current.push(c);
            } else {
                pieces.push(current);
                current = c.to_string();
                last = covering;
            }
        }
        pieces.push(current);
        pieces
    }

    /// レキシコンをTSV+JSON形式で書き出します
    ///
    /// （語彙素・注釈層）の組ごとに1行が出力されます。層を持たない
    /// 語彙素は空の単純分割を持つちょうど1行になります。行は
    /// （見出し語、品詞、語形、単純分割、注釈キー数）の昇順で
    /// 決定的に整列されます。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # エラー
    ///
    /// 語彙素の素性に予約キー（`annot_name`または`segmentation`）が
    /// 含まれる場合、[`UsegError::Schema`]が返されます。書き込みに
    /// 失敗した場合は[`UsegError::Io`]が返され、部分的に書かれた
    /// 出力が残る可能性があります。
    pub fn save<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let records = self.as_records()?;
        log::debug!("saving {} records", records.len());

        for record in &records {
            wtr.write_all(record::format_record(record)?.as_bytes())?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// レキシコンをファイルに書き出します
    ///
    /// # 引数
    ///
    /// * `path` - 出力ファイルのパス
    pub fn save_to_path<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let file = File::create(path)?;
        self.save(BufWriter::new(file))
    }

    /// 整列済みのレコード列を生成します
    fn as_records(&self) -> Result<Vec<SegRecord>> {
        let mut records = vec![];

        for (index, lexeme) in self.lexemes.iter().enumerate() {
            if lexeme.features.contains_key(KEY_ANNOT_NAME)
                || lexeme.features.contains_key(KEY_SEGMENTATION)
            {
                return Err(UsegError::schema(format!(
                    "lexeme {} carries a reserved feature key ('{KEY_ANNOT_NAME}' or '{KEY_SEGMENTATION}')",
                    self.print_lexeme(LexemeId(index)),
                )));
            }

            if lexeme.annotations.is_empty() {
                records.push(SegRecord {
                    form: lexeme.form.clone(),
                    lemma: lexeme.lemma.clone(),
                    pos: lexeme.pos.clone(),
                    simple_seg: vec![],
                    annot: lexeme.features.clone(),
                });
                continue;
            }

            for (annot_name, morphemes) in &lexeme.annotations {
                let mut sorted: Vec<&Morpheme> = morphemes.iter().collect();
                sorted.sort_by(|a, b| a.span().cmp(b.span()));

                let segmentation: Vec<FeatureValue> = sorted
                    .iter()
                    .map(|m| {
                        let mut segment = m.features().clone();
                        segment.insert(KEY_SPAN.to_string(), record::span_to_value(m.span()));
                        FeatureValue::Map(segment)
                    })
                    .collect();

                let mut annot = lexeme.features.clone();
                annot.insert(
                    KEY_ANNOT_NAME.to_string(),
                    FeatureValue::from(annot_name.as_str()),
                );
                annot.insert(
                    KEY_SEGMENTATION.to_string(),
                    FeatureValue::List(segmentation),
                );

                records.push(SegRecord {
                    form: lexeme.form.clone(),
                    lemma: lexeme.lemma.clone(),
                    pos: lexeme.pos.clone(),
                    simple_seg: Self::simple_seg_of(lexeme, annot_name),
                    annot,
                });
            }
        }

        records.sort_by(|a, b| {
            (&a.lemma, &a.pos, &a.form, &a.simple_seg, a.annot.len()).cmp(&(
                &b.lemma,
                &b.pos,
                &b.form,
                &b.simple_seg,
                b.annot.len(),
            ))
        });

        Ok(records)
    }

    /// TSV+JSON形式の入力を読み込み、内容をこのレキシコンに追加します
    ///
    /// 各行から語彙素を再構築し、分割情報の各要素をモルフィームとして
    /// 再挿入します。読み込みは単一の線形走査で、途中で失敗した場合の
    /// 再開はサポートされません。エラー時には構築中のレキシコン全体を
    /// 破棄してください。
    ///
    /// # 引数
    ///
    /// * `rdr` - 読み込み元
    ///
    /// # エラー
    ///
    /// 構造的に不正な行（フィールド数の誤り、不正なJSON、名前のない
    /// 分割、範囲外のスパン）に対して[`UsegError::Schema`]が返され
    /// ます。
    pub fn load<R>(&mut self, rdr: R) -> Result<()>
    where
        R: Read,
    {
        let rdr = BufReader::new(rdr);
        let mut rows = 0;

        for line in rdr.lines() {
            let line = line?;
            let record = record::parse_line(&line)?;

            let mut features = record.annot;
            let annot_name = features.remove(KEY_ANNOT_NAME);
            let segmentation = features.remove(KEY_SEGMENTATION);

            let annot_name = match segmentation {
                None => None,
                Some(_) => match annot_name.as_ref().and_then(FeatureValue::as_str) {
                    Some(name) => Some(name.to_string()),
                    None => {
                        return Err(UsegError::schema(format!(
                            "line '{line}' has unnamed segmentation"
                        )))
                    }
                },
            };

            let lex_id = self.add_lexeme(record.form, record.lemma, record.pos, features);

            if let (Some(annot_name), Some(segmentation)) = (annot_name, segmentation) {
                let segments = segmentation.as_list().ok_or_else(|| {
                    UsegError::schema(format!("segmentation of line '{line}' is not a list"))
                })?;

                for segment in segments {
                    let mut seg_features = segment
                        .as_map()
                        .cloned()
                        .ok_or_else(|| {
                            UsegError::schema(format!(
                                "segmentation of line '{line}' contains a non-object segment"
                            ))
                        })?;
                    let span_value = seg_features.remove(KEY_SPAN).ok_or_else(|| {
                        UsegError::schema(format!(
                            "segmentation of line '{line}' contains a segment without a span"
                        ))
                    })?;
                    let span = record::value_to_span(&span_value)?;

                    self.add_morpheme(lex_id, &annot_name, span, seg_features)
                        .map_err(|e| {
                            UsegError::schema(format!("invalid span in line '{line}': {e}"))
                        })?;
                }
            }

            rows += 1;
        }

        log::debug!("loaded {} rows", rows);
        Ok(())
    }

    /// ファイルからレキシコンを読み込みます
    ///
    /// # 引数
    ///
    /// * `path` - 入力ファイルのパス
    pub fn load_from_path<P>(&mut self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        self.load(file)
    }
}
