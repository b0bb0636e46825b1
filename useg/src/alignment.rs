//! モルフ列と語形の整列エンジン
//!
//! このモジュールは、理想化されたモルフ文字列の列を語形の文字列上に
//! 写像する整列アルゴリズムを提供します。モルフの連結が語形と正確に
//! 一致しない場合（大文字小文字、発音区別符号、異形態、文字の欠落・
//! 余剰）でも、文字クラスに敏感なコストを持つ編集距離型の動的計画法に
//! よって最小コストの境界分割を復元します。
//!
//! モルフの連結が語形と正確に一致する場合は、コスト0の経路が常に
//! 支配するため、正確な境界がそのまま得られます。

pub mod letter;

use std::rc::Rc;

use crate::common::MAX_WORD_LEN;
use crate::errors::{Result, UsegError};

use letter::{letter_class, strip_diacritics, LetterClass};

// Costs are ranked:
//  1. exact substitution
//  2. substitution differing only in diacritics
//  3. insertion or deletion of a vowel
//  4. vowel-for-vowel substitution
//  5. insertion or deletion of a consonant
//  6. any other substitution
fn subst_cost(mc: char, fc: char) -> f64 {
    if mc == fc {
        return 0.0;
    }

    if strip_diacritics(mc) == strip_diacritics(fc) {
        return 0.1;
    }

    if letter_class(mc) == LetterClass::Vowel && letter_class(fc) == LetterClass::Vowel {
        return 0.5;
    }

    1.5
}

fn insert_cost(c: char) -> f64 {
    if letter_class(c) == LetterClass::Vowel {
        0.3
    } else {
        1.0
    }
}

fn delete_cost(c: char) -> f64 {
    if letter_class(c) == LetterClass::Vowel {
        0.3
    } else {
        1.0
    }
}

/// 累積された境界リストの1要素
///
/// セルごとに境界リスト全体を複製すると空間消費が入力長の積を超える
/// ため、リストは前要素への共有参照でつながれた片方向リストとして
/// 保持されます。経路が分岐しても共通の接頭辞は1つのノード列を
/// 共有します。
struct BoundStep {
    offset: usize,
    prev: Option<Rc<BoundStep>>,
}

/// 探索空間の1セル
///
/// そのセルに至る最小コストと、そこまでに確定した境界リストの末尾を
/// 保持します。
#[derive(Clone)]
struct Cell {
    cost: f64,
    tail: Rc<BoundStep>,
}

#[inline]
fn push_bound(tail: &Rc<BoundStep>, offset: usize) -> Rc<BoundStep> {
    Rc::new(BoundStep {
        offset,
        prev: Some(Rc::clone(tail)),
    })
}

#[inline]
fn start_bound(offset: usize) -> Rc<BoundStep> {
    Rc::new(BoundStep { offset, prev: None })
}

fn collect_bounds(tail: &Rc<BoundStep>) -> Vec<usize> {
    let mut bounds = vec![];
    let mut step = Some(tail);
    while let Some(s) = step {
        bounds.push(s.offset);
        step = s.prev.as_ref();
    }
    bounds.reverse();
    bounds
}

/// モルフ連結上の境界位置をフラグ列として返します
///
/// 返り値の長さは連結の文字数+1で、各モルフの開始位置と全体の終端が
/// `true` になります。
fn bound_flags<S>(morphs: &[S]) -> Vec<bool>
where
    S: AsRef<str>,
{
    let total: usize = morphs.iter().map(|m| m.as_ref().chars().count()).sum();
    let mut flags = vec![false; total + 1];
    let mut offset = 0;
    for morph in morphs {
        flags[offset] = true;
        offset += morph.as_ref().chars().count();
    }
    flags[total] = true;
    flags
}

/// モルフ列を語形上に整列し、境界位置とコストを返します
///
/// `morphs` の各要素が語形 `form` のどの部分に対応するかを推定し、
/// 語形を `morphs.len()` 個の連続した断片に分割する境界位置の列を
/// 返します。境界はゼロ始まりの文字オフセットで、長さは
/// `morphs.len() + 1`、非減少、かつ `[0, 語形の文字数]` の範囲に
/// 収まります。コストは非負で、モルフの連結が語形と一致する場合は
/// 0になります。
///
/// 等コストの遷移は置換、挿入、削除の優先順で決定的に解決されます。
///
/// # 引数
///
/// * `morphs` - モルフ文字列の列
/// * `form` - 分割対象の語形
///
/// # 戻り値
///
/// 境界位置の列とコストのペア
///
/// # エラー
///
/// 語形が空の場合、モルフ列が空の場合、空のモルフが含まれる場合、
/// または入力が[`MAX_WORD_LEN`]文字を超える場合、
/// [`UsegError::Precondition`]が返されます。
///
/// # 例
///
/// ```
/// let (bounds, cost) = useg::infer_bounds(&["pes", "vod"], "pesvod")?;
/// assert_eq!(bounds, vec![0, 3, 6]);
/// assert_eq!(cost, 0.0);
/// # Ok::<(), useg::errors::UsegError>(())
/// ```
pub fn infer_bounds<S>(morphs: &[S], form: &str) -> Result<(Vec<usize>, f64)>
where
    S: AsRef<str>,
{
    if morphs.is_empty() {
        return Err(UsegError::precondition("morphs", "must not be empty"));
    }
    if form.is_empty() {
        return Err(UsegError::precondition("form", "must not be empty"));
    }
    for morph in morphs {
        if morph.as_ref().is_empty() {
            return Err(UsegError::precondition("morphs", "no morph may be empty"));
        }
    }

    let f: Vec<char> = form.chars().collect();
    let m: Vec<char> = morphs.iter().flat_map(|s| s.as_ref().chars()).collect();

    if f.len() > MAX_WORD_LEN || m.len() > MAX_WORD_LEN {
        return Err(UsegError::precondition(
            "form",
            format!("inputs longer than {MAX_WORD_LEN} characters are not supported"),
        ));
    }

    log::trace!(
        "inferring bounds of {} morphs in '{}'",
        morphs.len(),
        form
    );

    let is_bound = bound_flags(morphs);
    let f_len = f.len();
    let m_len = m.len();

    // Row 0: leading deletions of the un-consumed morph prefix. Crossing
    // a morph boundary pins it to offset 0.
    let mut prev_row: Vec<Cell> = Vec::with_capacity(m_len + 1);
    prev_row.push(Cell {
        cost: 0.0,
        tail: start_bound(0),
    });
    for j in 0..m_len {
        let base = &prev_row[j];
        let cost = base.cost + delete_cost(m[j]);
        let tail = if is_bound[j + 1] {
            push_bound(&base.tail, 0)
        } else {
            Rc::clone(&base.tail)
        };
        prev_row.push(Cell { cost, tail });
    }

    for i in 0..f_len {
        let mut curr: Vec<Cell> = Vec::with_capacity(m_len + 1);

        // Column 0: leading insertions of the un-consumed form prefix.
        // Boundary 0 is relocated to the current offset.
        curr.push(Cell {
            cost: prev_row[0].cost + insert_cost(f[i]),
            tail: start_bound(i + 1),
        });

        for j in 0..m_len {
            let s_cost = prev_row[j].cost + subst_cost(m[j], f[i]);
            let d_cost = curr[j].cost + delete_cost(m[j]);
            let i_cost = prev_row[j + 1].cost + insert_cost(f[i]);

            let cost = s_cost.min(d_cost).min(i_cost);

            // Ties resolve as substitution, then insertion, then deletion.
            let tail = if cost == s_cost {
                if is_bound[j + 1] {
                    push_bound(&prev_row[j].tail, i + 1)
                } else {
                    Rc::clone(&prev_row[j].tail)
                }
            } else if cost == i_cost {
                Rc::clone(&prev_row[j + 1].tail)
            } else {
                if is_bound[j + 1] {
                    push_bound(&curr[j].tail, i + 1)
                } else {
                    Rc::clone(&curr[j].tail)
                }
            };

            curr.push(Cell { cost, tail });
        }

        prev_row = curr;
    }

    let last = &prev_row[m_len];
    let bounds = collect_bounds(&last.tail);

    debug_assert_eq!(bounds.len(), morphs.len() + 1);
    debug_assert!(bounds.windows(2).all(|w| w[0] <= w[1]));
    debug_assert!(*bounds.last().unwrap() <= f_len);

    Ok((bounds, last.cost))
}
